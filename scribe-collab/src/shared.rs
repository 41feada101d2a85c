//! Replicated layout settings, backed by a yrs map.
//!
//! The room's shared scalars (page margins today) live in one yrs map
//! named `layout`. Any client may write; conflict resolution is the
//! store's own last-write-wins semantics — nothing is re-implemented
//! here. Reads return `None` for absent keys so callers can apply
//! their documented defaults.

use thiserror::Error;
use yrs::updates::decoder::Decode;
use yrs::{Any, Doc, Map, MapRef, Out, ReadTxn, StateVector, Transact, Update};

const LAYOUT_MAP: &str = "layout";
const LEFT_MARGIN: &str = "leftMargin";
const RIGHT_MARGIN: &str = "rightMargin";

#[derive(Debug, Error)]
pub enum CollabError {
    #[error("malformed update: {0}")]
    MalformedUpdate(String),
    #[error("update could not be applied: {0}")]
    ApplyFailed(String),
}

/// Room-scoped replicated key/value state.
pub struct SharedDoc {
    doc: Doc,
    layout: MapRef,
}

impl SharedDoc {
    pub fn new() -> Self {
        let doc = Doc::new();
        let layout = doc.get_or_insert_map(LAYOUT_MAP);
        Self { doc, layout }
    }

    /// Left page margin, `None` when no client has written it yet.
    pub fn left_margin(&self) -> Option<f64> {
        self.read_number(LEFT_MARGIN)
    }

    /// Right page margin, `None` when no client has written it yet.
    pub fn right_margin(&self) -> Option<f64> {
        self.read_number(RIGHT_MARGIN)
    }

    /// Write the left margin and return the delta to broadcast.
    pub fn set_left_margin(&self, value: f64) -> Vec<u8> {
        self.write_number(LEFT_MARGIN, value)
    }

    /// Write the right margin and return the delta to broadcast.
    pub fn set_right_margin(&self, value: f64) -> Vec<u8> {
        self.write_number(RIGHT_MARGIN, value)
    }

    fn read_number(&self, key: &str) -> Option<f64> {
        let txn = self.doc.transact();
        match self.layout.get(&txn, key) {
            Some(Out::Any(Any::Number(n))) => Some(n),
            Some(Out::Any(Any::BigInt(n))) => Some(n as f64),
            _ => None,
        }
    }

    fn write_number(&self, key: &str, value: f64) -> Vec<u8> {
        let mut txn = self.doc.transact_mut();
        self.layout.insert(&mut txn, key, value);
        txn.encode_update_v1()
    }

    /// Full state as a single update, for bringing a new client up to date.
    pub fn encode_full_state(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&StateVector::default())
    }

    /// State vector for incremental sync.
    pub fn state_vector(&self) -> StateVector {
        self.doc.transact().state_vector()
    }

    /// Everything the remote identified by `remote` is missing.
    pub fn encode_diff(&self, remote: &StateVector) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(remote)
    }

    /// Apply a remote update (local echo included — applying our own
    /// update is a no-op under the store's consistency model).
    pub fn apply_update(&self, bytes: &[u8]) -> Result<(), CollabError> {
        let update =
            Update::decode_v1(bytes).map_err(|e| CollabError::MalformedUpdate(e.to_string()))?;
        let mut txn = self.doc.transact_mut();
        txn.apply_update(update)
            .map_err(|e| CollabError::ApplyFailed(e.to_string()))?;
        Ok(())
    }
}

impl Default for SharedDoc {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Tests
// ===================================================================
