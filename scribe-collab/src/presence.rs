//! Collaborator presence for a document room.
//!
//! Presence is per-connection, ephemeral metadata: who is here, under
//! what name and avatar, with what cursor color. Join/Leave messages
//! travel over the collaboration channel (bincode-encoded); the room
//! tracks remote peers in arrival order and keeps the local user's own
//! entry separate from the others' collection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ───────────────────────────────────────────────────────────────────
// Colors
// ───────────────────────────────────────────────────────────────────

/// RGBA color for a collaborator's cursor and avatar ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl PresenceColor {
    /// Stable, visually distinct color derived from a connection id.
    ///
    /// HSL with fixed saturation/lightness; the hue comes from the id
    /// hash so the same connection always renders the same color.
    pub fn from_uuid(id: Uuid) -> Self {
        let hash = id.as_u128();
        let hue = ((hash % 360) as f32) / 360.0;
        let (r, g, b) = hsl_to_rgb(hue, 0.7, 0.6);
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

// ───────────────────────────────────────────────────────────────────
// Entries and wire messages
// ───────────────────────────────────────────────────────────────────

/// One connected collaborator. The id is unique per connection, not
/// per person — the same user in two tabs appears twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub connection_id: Uuid,
    pub name: String,
    /// Avatar image reference (URL or asset key).
    pub avatar: String,
    pub color: Option<PresenceColor>,
}

/// Presence messages sent over the collaboration channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresenceMessage {
    /// Announce a connection with its display profile.
    Join { entry: PresenceEntry },
    /// Clean disconnect.
    Leave { connection_id: Uuid },
}

impl PresenceMessage {
    /// Encode to binary (bincode).
    pub fn encode(&self) -> Result<Vec<u8>, String> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| e.to_string())
    }

    /// Decode from binary.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let (msg, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| e.to_string())?;
        Ok(msg)
    }

    /// The connection id behind any variant.
    pub fn connection_id(&self) -> Uuid {
        match self {
            PresenceMessage::Join { entry } => entry.connection_id,
            PresenceMessage::Leave { connection_id } => *connection_id,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Room
// ───────────────────────────────────────────────────────────────────

/// Presence state for one document room.
///
/// Remote peers are kept in arrival order — the order the underlying
/// store registered them, not any display-sorted order.
pub struct PresenceRoom {
    local_id: Uuid,
    local: Option<PresenceEntry>,
    peers: Vec<PresenceEntry>,
}

impl PresenceRoom {
    pub fn new(local_id: Uuid) -> Self {
        Self {
            local_id,
            local: None,
            peers: Vec::new(),
        }
    }

    /// Set the local user's own presence profile.
    pub fn set_self(&mut self, name: impl Into<String>, avatar: impl Into<String>) {
        self.local = Some(PresenceEntry {
            connection_id: self.local_id,
            name: name.into(),
            avatar: avatar.into(),
            color: Some(PresenceColor::from_uuid(self.local_id)),
        });
    }

    /// Handle an incoming presence message. Messages about the local
    /// connection are ignored — self is never part of the others.
    pub fn handle_message(&mut self, msg: &PresenceMessage) {
        if msg.connection_id() == self.local_id {
            return;
        }
        match msg {
            PresenceMessage::Join { entry } => {
                // A rejoin refreshes the profile but keeps arrival order.
                if let Some(existing) = self
                    .peers
                    .iter_mut()
                    .find(|p| p.connection_id == entry.connection_id)
                {
                    *existing = entry.clone();
                } else {
                    log::debug!("peer joined: {} ({})", entry.name, entry.connection_id);
                    self.peers.push(entry.clone());
                }
            }
            PresenceMessage::Leave { connection_id } => {
                self.peers.retain(|p| p.connection_id != *connection_id);
            }
        }
    }

    /// Remote collaborators in arrival order.
    pub fn others(&self) -> &[PresenceEntry] {
        &self.peers
    }

    /// The local user's own entry, if a profile has been set.
    pub fn self_entry(&self) -> Option<&PresenceEntry> {
        self.local.as_ref()
    }

    pub fn local_id(&self) -> Uuid {
        self.local_id
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Join announcement for the local connection. Requires a profile
    /// set via [`PresenceRoom::set_self`].
    pub fn create_join_message(&self) -> Option<PresenceMessage> {
        self.local
            .clone()
            .map(|entry| PresenceMessage::Join { entry })
    }

    /// Leave announcement for the local connection.
    pub fn create_leave_message(&self) -> PresenceMessage {
        PresenceMessage::Leave {
            connection_id: self.local_id,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
