//! # scribe-collab — Shared document state for Scribe rooms
//!
//! One "room" per open document. The room carries two kinds of shared
//! state, mirroring the split between durable and ephemeral data:
//!
//! ```text
//! ┌──────────────────────┐
//! │ SharedDoc (yrs)      │  replicated scalars: leftMargin, rightMargin
//! │  last-write-wins     │  ── update exchange between clients
//! └──────────────────────┘
//! ┌──────────────────────┐
//! │ PresenceRoom         │  ephemeral per-connection metadata
//! │  arrival-ordered     │  ── Join/Leave messages (bincode wire)
//! └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`shared`] — yrs-backed replicated layout settings
//! - [`presence`] — collaborator presence: entries, messages, room

pub mod presence;
pub mod shared;

pub use presence::{PresenceColor, PresenceEntry, PresenceMessage, PresenceRoom};
pub use shared::{CollabError, SharedDoc};
