//! Read-only collaborator projection for the avatar stack.
//!
//! Purely derived from the presence room; never mutates shared state.
//! Display invariant: with zero others the presence region is entirely
//! absent — no self-avatar, no separator — not merely an empty list.

use scribe_collab::{PresenceColor, PresenceEntry, PresenceRoom};

/// One rendered avatar.
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    pub name: String,
    pub avatar: String,
    pub color: [f32; 4],
}

/// The presence region: self (when known) plus others in arrival
/// order, followed by the separator the region always carries.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceRegion {
    pub self_avatar: Option<Avatar>,
    pub others: Vec<Avatar>,
}

/// Project the room into a renderable region. Returns `None` when no
/// others are connected, suppressing the whole region.
pub fn presence_region(room: &PresenceRoom) -> Option<PresenceRegion> {
    let others = room.others();
    if others.is_empty() {
        return None;
    }

    Some(PresenceRegion {
        self_avatar: room.self_entry().map(|entry| Avatar {
            // The local user is always labeled "You", not by name.
            name: "You".into(),
            avatar: entry.avatar.clone(),
            color: entry_color(entry),
        }),
        others: others
            .iter()
            .map(|entry| Avatar {
                name: entry.name.clone(),
                avatar: entry.avatar.clone(),
                color: entry_color(entry),
            })
            .collect(),
    })
}

fn entry_color(entry: &PresenceEntry) -> [f32; 4] {
    entry
        .color
        .unwrap_or_else(|| PresenceColor::from_uuid(entry.connection_id))
        .to_array()
}

// ===================================================================
// Tests
// ===================================================================
