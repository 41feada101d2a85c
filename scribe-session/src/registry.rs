//! The observable "current session" register.
//!
//! UI pieces that did not create the engine (menu, toolbar) still need
//! to issue commands against it, so the session that mounted the engine
//! publishes a non-owning handle here. The register is last-write-wins
//! with no validation: `None` is the documented way to say "no active
//! session" during teardown or before creation completes.

use std::cell::RefCell;
use std::rc::Rc;

use scribe_engine::{Engine, EngineEvent};

/// Shared, non-owning handle to the active engine. The mounting view
/// keeps ownership; the registry and command issuers only borrow.
pub type SessionHandle = Rc<RefCell<Engine>>;

type Observer = Box<dyn FnMut(Option<&SessionHandle>)>;

/// Last-write-wins slot holding the current session, with synchronous
/// change notification. All writes arrive on the single event thread,
/// so no locking is involved.
#[derive(Default)]
pub struct SessionRegistry {
    current: Option<SessionHandle>,
    observers: Vec<Observer>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered session. Observers are notified
    /// synchronously with the new value, including on replacement by
    /// the same handle — dependents always see the freshest reference.
    pub fn set_current(&mut self, session: Option<SessionHandle>) {
        self.current = session;
        for observer in &mut self.observers {
            observer(self.current.as_ref());
        }
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<SessionHandle> {
        self.current.clone()
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Subscribe to "current session changed". The callback fires
    /// synchronously from every [`SessionRegistry::set_current`].
    pub fn subscribe(&mut self, observer: impl FnMut(Option<&SessionHandle>) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Drive the register from an engine lifecycle event.
    ///
    /// Every event re-registers the same handle except `Destroyed`,
    /// which clears the slot. `ContentError` is observable but
    /// non-fatal: it is logged and the handle stays registered.
    pub fn handle_engine_event(&mut self, handle: &SessionHandle, event: &EngineEvent) {
        match event {
            EngineEvent::Destroyed => {
                log::debug!("engine destroyed; clearing current session");
                self.set_current(None);
            }
            EngineEvent::ContentError => {
                log::warn!("engine reported a content error; session stays registered");
                self.set_current(Some(handle.clone()));
            }
            _ => self.set_current(Some(handle.clone())),
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
