//! User intents mapped onto engine chains, metadata-service calls, and
//! exports.
//!
//! Dispatch never surfaces an error to its caller: every command path
//! either completes, silently no-ops (no registered session), or
//! reports through a transient notification. Formatting commands
//! issued before the engine mounts are expected and safely ignorable.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use uuid::Uuid;

use scribe_engine::{Alignment, CommandChain, EngineEvent, Mark};

use crate::export::{self, ExportArtifact, ExportFormat};
use crate::registry::{SessionHandle, SessionRegistry};

pub type DocumentId = Uuid;

/// Failures reported by the external document-metadata service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service unavailable")]
    Unavailable,
    #[error("document not found")]
    NotFound,
    #[error("{0}")]
    Rejected(String),
}

/// The external document-metadata store (titles, ownership).
pub trait DocumentService {
    fn create(&mut self, title: &str, initial_content: &str) -> Result<DocumentId, ServiceError>;
    fn rename(&mut self, id: DocumentId, title: &str) -> Result<(), ServiceError>;
    fn remove(&mut self, id: DocumentId) -> Result<(), ServiceError>;
}

/// Transient user-visible notifications (toasts).
pub trait Notifier {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Route changes in the host UI.
pub trait Navigator {
    fn go_to_document(&mut self, id: DocumentId);
}

/// Client download boundary: save a blob, or hand control to the host
/// print facility.
pub trait DownloadSink {
    fn save(&mut self, artifact: ExportArtifact);
    fn print(&mut self);
}

/// The open document this dispatcher serves.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub id: DocumentId,
    pub title: String,
}

/// A named user intent. Stateless; dispatched once per user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleStrike,
    ClearFormatting,
    Undo,
    Redo,
    /// Parameters pass through unvalidated — zero rows or columns is
    /// the engine's to reject.
    InsertTable {
        rows: u32,
        cols: u32,
    },
    SetAlignment(Alignment),
    SetFontFamily(String),
    Export(ExportFormat),
    Print,
    NewDocument,
    RenameDocument {
        title: String,
    },
    RemoveDocument,
}

/// Translates commands into exactly one of: an atomic engine chain, a
/// metadata-service call, or an export.
pub struct Dispatcher {
    registry: Rc<RefCell<SessionRegistry>>,
    service: Box<dyn DocumentService>,
    notifier: Box<dyn Notifier>,
    navigator: Box<dyn Navigator>,
    downloads: Box<dyn DownloadSink>,
    context: DocumentContext,
}

impl Dispatcher {
    pub fn new(
        registry: Rc<RefCell<SessionRegistry>>,
        service: Box<dyn DocumentService>,
        notifier: Box<dyn Notifier>,
        navigator: Box<dyn Navigator>,
        downloads: Box<dyn DownloadSink>,
        context: DocumentContext,
    ) -> Self {
        Self {
            registry,
            service,
            notifier,
            navigator,
            downloads,
            context,
        }
    }

    pub fn context(&self) -> &DocumentContext {
        &self.context
    }

    /// Dispatch one command. Never returns an error; see module docs.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::ToggleBold => {
                self.run_chain(CommandChain::new().focus().toggle_mark(Mark::Bold))
            }
            Command::ToggleItalic => {
                self.run_chain(CommandChain::new().focus().toggle_mark(Mark::Italic))
            }
            Command::ToggleUnderline => {
                self.run_chain(CommandChain::new().focus().toggle_mark(Mark::Underline))
            }
            Command::ToggleStrike => {
                self.run_chain(CommandChain::new().focus().toggle_mark(Mark::Strike))
            }
            Command::ClearFormatting => {
                self.run_chain(CommandChain::new().focus().unset_all_marks())
            }
            Command::Undo => self.run_chain(CommandChain::new().focus().undo()),
            Command::Redo => self.run_chain(CommandChain::new().focus().redo()),
            Command::InsertTable { rows, cols } => {
                self.run_chain(CommandChain::new().focus().insert_table(rows, cols, false))
            }
            Command::SetAlignment(align) => {
                self.run_chain(CommandChain::new().focus().set_alignment(align))
            }
            Command::SetFontFamily(family) => {
                self.run_chain(CommandChain::new().focus().set_font_family(family))
            }
            Command::Export(format) => self.export(format),
            Command::Print => self.print(),
            Command::NewDocument => self.create_document(),
            Command::RenameDocument { title } => self.rename_document(title),
            Command::RemoveDocument => self.remove_document(),
        }
    }

    /// Commit an atomic chain against the current session, if any.
    fn run_chain(&mut self, chain: CommandChain) {
        let current = self.registry.borrow().current();
        let Some(handle) = current else {
            log::debug!("no active session; command ignored");
            return;
        };
        if let Err(err) = handle.borrow_mut().apply(&chain) {
            // The engine rejected the chain (e.g. zero-sized table).
            log::warn!("engine rejected command chain: {err}");
        }
        self.pump(&handle);
    }

    /// Forward queued engine events so dependents see the freshest
    /// handle after every committed chain.
    fn pump(&mut self, handle: &SessionHandle) {
        let events: Vec<EngineEvent> = handle.borrow_mut().drain_events();
        for event in &events {
            self.registry.borrow_mut().handle_engine_event(handle, event);
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let current = self.registry.borrow().current();
        let Some(handle) = current else {
            log::debug!("export skipped: no active session");
            return;
        };
        let artifact = {
            let engine = handle.borrow();
            export::serialize(&engine, format, &self.context.title)
        };
        match artifact {
            Ok(artifact) => self.downloads.save(artifact),
            Err(err) => log::warn!("export failed: {err}"),
        }
    }

    fn print(&mut self) {
        if self.registry.borrow().has_current() {
            self.downloads.print();
        } else {
            log::debug!("print skipped: no active session");
        }
    }

    fn create_document(&mut self) {
        match self.service.create("Untitled Document", "") {
            Ok(id) => {
                self.notifier.success("Document created");
                self.navigator.go_to_document(id);
            }
            Err(err) => {
                log::warn!("document create failed: {err}");
                self.notifier.error("Something went wrong");
            }
        }
    }

    fn rename_document(&mut self, title: String) {
        match self.service.rename(self.context.id, &title) {
            Ok(()) => {
                self.context.title = title;
                self.notifier.success("Document renamed");
            }
            Err(err) => {
                log::warn!("document rename failed: {err}");
                self.notifier.error("Something went wrong");
            }
        }
    }

    fn remove_document(&mut self) {
        match self.service.remove(self.context.id) {
            Ok(()) => self.notifier.success("Document removed"),
            Err(err) => {
                log::warn!("document remove failed: {err}");
                self.notifier.error("Something went wrong");
            }
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
