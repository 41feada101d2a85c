//! The view-owned editor session.
//!
//! Exactly one `EditorSession` exists per open document per client: it
//! is created when the document view mounts and destroyed when it
//! unmounts. The session owns the engine; everyone else reaches it
//! through the registry's non-owning handle.

use std::cell::RefCell;
use std::rc::Rc;

use scribe_engine::Engine;

use crate::registry::{SessionHandle, SessionRegistry};

/// Live handle to the editing engine for the current user.
pub struct EditorSession {
    engine: SessionHandle,
}

impl EditorSession {
    /// Mount a session, optionally seeding the engine with initial
    /// plain-text content, and publish it to the registry.
    pub fn mount(
        registry: &Rc<RefCell<SessionRegistry>>,
        initial_content: Option<&str>,
    ) -> Self {
        let engine = match initial_content {
            Some(text) => Engine::with_text(text),
            None => Engine::new(),
        };
        let session = Self {
            engine: Rc::new(RefCell::new(engine)),
        };
        // Flushes the Created event into the registry.
        session.pump_events(registry);
        session
    }

    /// Non-owning handle for command issuers.
    pub fn engine(&self) -> &SessionHandle {
        &self.engine
    }

    /// Forward queued engine lifecycle events to the registry. Call
    /// after any direct engine interaction (focus, selection, import).
    pub fn pump_events(&self, registry: &Rc<RefCell<SessionRegistry>>) {
        let events = self.engine.borrow_mut().drain_events();
        for event in &events {
            registry.borrow_mut().handle_engine_event(&self.engine, event);
        }
    }

    /// Unmount: destroy the engine and clear the registry.
    pub fn unmount(self, registry: &Rc<RefCell<SessionRegistry>>) {
        self.engine.borrow_mut().destroy();
        self.pump_events(registry);
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_engine::{CommandChain, Selection};

    fn registry() -> Rc<RefCell<SessionRegistry>> {
        Rc::new(RefCell::new(SessionRegistry::new()))
    }

    #[test]
    fn test_mount_registers_session() {
        let reg = registry();
        let session = EditorSession::mount(&reg, None);

        let current = reg.borrow().current().expect("session registered");
        assert_eq!(current.borrow().id(), session.engine().borrow().id());
    }

    #[test]
    fn test_mount_with_initial_content() {
        let reg = registry();
        let session = EditorSession::mount(&reg, Some("seeded"));
        assert_eq!(session.engine().borrow().to_text(), "seeded");
    }

    #[test]
    fn test_unmount_clears_registry() {
        let reg = registry();
        let session = EditorSession::mount(&reg, None);
        assert!(reg.borrow().has_current());

        session.unmount(&reg);
        assert!(!reg.borrow().has_current());
    }

    #[test]
    fn test_selection_and_focus_republish() {
        let reg = registry();
        let session = EditorSession::mount(&reg, Some("line"));

        let republishes = Rc::new(RefCell::new(0));
        let counter = republishes.clone();
        reg.borrow_mut().subscribe(move |current| {
            if current.is_some() {
                *counter.borrow_mut() += 1;
            }
        });

        session.engine().borrow_mut().focus();
        session
            .engine()
            .borrow_mut()
            .set_selection(Selection::caret(0));
        session.pump_events(&reg);

        // Focused + SelectionUpdated both re-registered the handle.
        assert_eq!(*republishes.borrow(), 2);
        assert!(reg.borrow().has_current());
    }

    #[test]
    fn test_edits_survive_event_pump() {
        let reg = registry();
        let session = EditorSession::mount(&reg, Some("text"));

        session
            .engine()
            .borrow_mut()
            .apply(&CommandChain::new().insert_text(" more"))
            .unwrap();
        session.pump_events(&reg);

        let current = reg.borrow().current().unwrap();
        assert_eq!(current.borrow().to_text(), "text more");
    }
}
