//! # scribe-session — Collaborative editor session core
//!
//! Owns a single user's live editing session: keeps the visible editor
//! state synchronized with the room's shared state (others' presence,
//! shared page margins) and exposes the command surface (formatting,
//! table insertion, undo/redo, export, document lifecycle) that
//! mutates the session consistently.
//!
//! ## Data flow
//!
//! ```text
//! user action
//!     │
//!     ▼
//! Dispatcher::dispatch(Command)
//!     │
//!     ├── engine chain (atomic edit batch)  ──► Engine
//!     ├── metadata service call             ──► DocumentService
//!     └── export + client download          ──► DownloadSink
//!
//! Engine lifecycle event
//!     │
//!     ▼
//! SessionRegistry (last-write-wins slot, observers notified)
//!
//! Shared room state (margins, presence)
//!     │
//!     ▼
//! page_layout() / presence_region()  — pure read-side projections
//! ```
//!
//! ## Modules
//!
//! - [`registry`] — the observable "current session" register
//! - [`session`] — the view-owned session mount that feeds the registry
//! - [`dispatch`] — user intents mapped onto engine/service/export calls
//! - [`export`] — content serialization and download artifacts
//! - [`presence_view`] — read-only collaborator projection
//! - [`layout`] — shared margin accessor with defaulting

pub mod dispatch;
pub mod export;
pub mod layout;
pub mod presence_view;
pub mod registry;
pub mod session;

pub use dispatch::{
    Command, Dispatcher, DocumentContext, DocumentId, DocumentService, DownloadSink, Navigator,
    Notifier, ServiceError,
};
pub use export::{ExportArtifact, ExportFormat};
pub use layout::{page_layout, PageLayout, DEFAULT_MARGIN};
pub use presence_view::{presence_region, Avatar, PresenceRegion};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::EditorSession;
