//! # scribe-engine — Reference rich-text editing engine for Scribe
//!
//! Owns the document content model and the command surface the session
//! core drives. The engine is deliberately small: block-level nodes
//! (paragraphs, headings, tables), character marks on text runs, and a
//! chain-and-commit edit interface with all-or-nothing semantics.
//!
//! ## Architecture
//!
//! ```text
//! CommandChain (focus + toggle_mark + …)
//!       │
//!       ▼
//! Engine::apply()  ── atomic: whole chain or nothing
//!       │
//!       ▼
//! DocTree mutation + undo snapshot
//!       │
//!       ▼
//! EngineEvent queue (Updated, TransactionCommitted, …)
//! ```
//!
//! ## Modules
//!
//! - [`node`] — document tree: blocks, text runs, marks, alignment
//! - [`chain`] — edit primitives and the chain builder
//! - [`engine`] — the engine itself: apply, history, lifecycle, exports

pub mod chain;
pub mod engine;
pub mod node;

pub use chain::{CommandChain, EditOp};
pub use engine::{Engine, EngineError, EngineEvent, Selection};
pub use node::{Alignment, DocTree, Mark, Node, TableCell, TableRow, TextRun};
