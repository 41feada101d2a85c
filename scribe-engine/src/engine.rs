//! The reference editing engine: atomic command chains, undo history,
//! lifecycle events, and content serialization.
//!
//! Hosts drive the engine through [`Engine::apply`] and observe it
//! through the event queue ([`Engine::drain_events`]). Every event is a
//! re-publish of the same engine reference except [`EngineEvent::Destroyed`],
//! after which the engine rejects further chains.

use std::collections::VecDeque;

use thiserror::Error;
use uuid::Uuid;

use crate::chain::{CommandChain, EditOp};
use crate::node::{DocTree, Mark, Node, TableCell, TableRow, TextRun};

/// Lifecycle events emitted by the engine, drained by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Created,
    Updated,
    SelectionUpdated,
    TransactionCommitted,
    Focused,
    Blurred,
    ContentError,
    Destroyed,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Table insertion with zero rows or columns. Rejecting here (not in
    /// the dispatcher) keeps parameter validation an engine concern.
    #[error("table must have at least one row and one column")]
    EmptyTable,
    #[error("engine has been destroyed")]
    Destroyed,
    #[error("malformed document tree: {0}")]
    MalformedTree(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Block-granular selection: anchor and head are block indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// Collapsed selection (caret) at a block.
    pub fn caret(index: usize) -> Self {
        Self {
            anchor: index,
            head: index,
        }
    }

    /// Range selection from anchor to head (either direction).
    pub fn span(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    fn ordered(&self) -> (usize, usize) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// Everything a command chain may touch. Cloned at chain start so that
/// a failing primitive leaves the engine exactly as it was.
#[derive(Debug, Clone)]
struct Core {
    tree: DocTree,
    selection: Selection,
    undo: Vec<DocTree>,
    redo: Vec<DocTree>,
    focused: bool,
}

/// The reference rich-text engine.
pub struct Engine {
    id: Uuid,
    core: Core,
    events: VecDeque<EngineEvent>,
    alive: bool,
}

impl Engine {
    /// Create an empty engine. Queues a `Created` event.
    pub fn new() -> Self {
        let mut engine = Self {
            id: Uuid::new_v4(),
            core: Core {
                tree: DocTree::new(),
                selection: Selection::caret(0),
                undo: Vec::new(),
                redo: Vec::new(),
                focused: false,
            },
            events: VecDeque::new(),
            alive: true,
        };
        engine.events.push_back(EngineEvent::Created);
        engine
    }

    /// Create an engine seeded with plain text, one paragraph per line.
    pub fn with_text(text: &str) -> Self {
        let mut engine = Self::new();
        if !text.is_empty() {
            engine.core.tree.nodes = text
                .lines()
                .map(|line| Node::Paragraph {
                    align: Default::default(),
                    font: None,
                    runs: if line.is_empty() {
                        Vec::new()
                    } else {
                        vec![TextRun::plain(line)]
                    },
                })
                .collect();
        }
        engine
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_focused(&self) -> bool {
        self.core.focused
    }

    pub fn tree(&self) -> &DocTree {
        &self.core.tree
    }

    pub fn selection(&self) -> Selection {
        self.core.selection
    }

    /// Drain all queued lifecycle events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Move the selection. Indices are clamped to the document.
    pub fn set_selection(&mut self, selection: Selection) {
        let last = self.core.tree.len().saturating_sub(1);
        self.core.selection = Selection {
            anchor: selection.anchor.min(last),
            head: selection.head.min(last),
        };
        self.events.push_back(EngineEvent::SelectionUpdated);
    }

    pub fn focus(&mut self) {
        if !self.core.focused {
            self.core.focused = true;
            self.events.push_back(EngineEvent::Focused);
        }
    }

    pub fn blur(&mut self) {
        if self.core.focused {
            self.core.focused = false;
            self.events.push_back(EngineEvent::Blurred);
        }
    }

    /// Tear the engine down. Further chains are rejected.
    pub fn destroy(&mut self) {
        if self.alive {
            self.alive = false;
            self.events.push_back(EngineEvent::Destroyed);
        }
    }

    /// Apply a command chain atomically.
    ///
    /// The chain runs against a scratch copy of the editable state; only
    /// a fully successful run is committed. Content-mutating chains push
    /// one undo snapshot (chain-granular history, matching the
    /// chain-and-commit serialization point).
    pub fn apply(&mut self, chain: &CommandChain) -> Result<(), EngineError> {
        if !self.alive {
            return Err(EngineError::Destroyed);
        }

        let mut scratch = self.core.clone();
        let snapshot = scratch.tree.clone();
        let mut fx = ChainEffects::default();

        for op in chain.ops() {
            apply_op(&mut scratch, op, &mut fx)?;
        }

        if fx.content_changed {
            scratch.undo.push(snapshot);
            scratch.redo.clear();
        }

        let was_focused = self.core.focused;
        self.core = scratch;

        if fx.gained_focus && !was_focused {
            self.events.push_back(EngineEvent::Focused);
        }
        if fx.tree_changed || fx.content_changed {
            self.events.push_back(EngineEvent::Updated);
        }
        self.events.push_back(EngineEvent::TransactionCommitted);
        Ok(())
    }

    /// Flattened plain-text extraction.
    pub fn to_text(&self) -> String {
        self.core.tree.to_text()
    }

    /// Styled markup rendering.
    pub fn to_html(&self) -> String {
        self.core.tree.to_html()
    }

    /// Structured tree serialization, re-importable by a compatible engine.
    pub fn to_tree_json(&self) -> Result<Vec<u8>, EngineError> {
        Ok(serde_json::to_vec(&self.core.tree)?)
    }

    /// Replace the document with a previously exported tree.
    ///
    /// A parse failure queues `ContentError` and leaves the engine
    /// registered and usable with its previous content.
    pub fn import_tree_json(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        match serde_json::from_slice::<DocTree>(bytes) {
            Ok(tree) => {
                let prev = std::mem::replace(&mut self.core.tree, tree);
                self.core.undo.push(prev);
                self.core.redo.clear();
                let last = self.core.tree.len().saturating_sub(1);
                self.core.selection = Selection::caret(last);
                self.events.push_back(EngineEvent::Updated);
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected malformed document tree: {err}");
                self.events.push_back(EngineEvent::ContentError);
                Err(EngineError::MalformedTree(err.to_string()))
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ChainEffects {
    /// Content ops ran and changed the tree (push an undo snapshot).
    content_changed: bool,
    /// The tree changed for any reason, including undo/redo.
    tree_changed: bool,
    gained_focus: bool,
}

fn apply_op(core: &mut Core, op: &EditOp, fx: &mut ChainEffects) -> Result<(), EngineError> {
    match op {
        EditOp::Focus => {
            core.focused = true;
            fx.gained_focus = true;
        }

        EditOp::ToggleMark(mark) => {
            if toggle_mark(core, *mark) {
                fx.content_changed = true;
                fx.tree_changed = true;
            }
        }

        EditOp::UnsetAllMarks => {
            let mut changed = false;
            if let Some((lo, hi)) = selected_blocks(core) {
                for node in &mut core.tree.nodes[lo..=hi] {
                    if let Some(runs) = node.runs_mut() {
                        for run in runs.iter_mut() {
                            if !run.marks.is_empty() {
                                run.marks.clear();
                                changed = true;
                            }
                        }
                    }
                }
            }
            if changed {
                fx.content_changed = true;
                fx.tree_changed = true;
            }
        }

        EditOp::SetAlignment(new_align) => {
            let mut changed = false;
            if let Some((lo, hi)) = selected_blocks(core) {
                for node in &mut core.tree.nodes[lo..=hi] {
                    match node {
                        Node::Paragraph { align, .. } | Node::Heading { align, .. } => {
                            if *align != *new_align {
                                *align = *new_align;
                                changed = true;
                            }
                        }
                        Node::Table { .. } => {}
                    }
                }
            }
            if changed {
                fx.content_changed = true;
                fx.tree_changed = true;
            }
        }

        EditOp::SetFontFamily(family) => {
            let mut changed = false;
            if let Some((lo, hi)) = selected_blocks(core) {
                for node in &mut core.tree.nodes[lo..=hi] {
                    match node {
                        Node::Paragraph { font, .. } | Node::Heading { font, .. } => {
                            if font.as_deref() != Some(family.as_str()) {
                                *font = Some(family.clone());
                                changed = true;
                            }
                        }
                        Node::Table { .. } => {}
                    }
                }
            }
            if changed {
                fx.content_changed = true;
                fx.tree_changed = true;
            }
        }

        EditOp::InsertTable {
            rows,
            cols,
            with_header_row,
        } => {
            if *rows == 0 || *cols == 0 {
                return Err(EngineError::EmptyTable);
            }
            let table = Node::Table {
                with_header_row: *with_header_row,
                rows: (0..*rows)
                    .map(|_| TableRow {
                        cells: (0..*cols).map(|_| TableCell::default()).collect(),
                    })
                    .collect(),
            };
            let at = insert_index(core);
            core.tree.nodes.insert(at, table);
            core.selection = Selection::caret(at);
            fx.content_changed = true;
            fx.tree_changed = true;
        }

        EditOp::InsertText(text) => {
            let idx = core.selection.head;
            match core.tree.nodes.get_mut(idx).and_then(Node::runs_mut) {
                Some(runs) => runs.push(TextRun::plain(text.clone())),
                None => {
                    // Cursor on a table, or the document is empty: start
                    // a new paragraph after the cursor block.
                    let at = insert_index(core);
                    core.tree.nodes.insert(
                        at,
                        Node::Paragraph {
                            align: Default::default(),
                            font: None,
                            runs: vec![TextRun::plain(text.clone())],
                        },
                    );
                    core.selection = Selection::caret(at);
                }
            }
            fx.content_changed = true;
            fx.tree_changed = true;
        }

        EditOp::Undo => {
            if let Some(prev) = core.undo.pop() {
                let current = std::mem::replace(&mut core.tree, prev);
                core.redo.push(current);
                clamp_selection(core);
                fx.tree_changed = true;
            }
        }

        EditOp::Redo => {
            if let Some(next) = core.redo.pop() {
                let current = std::mem::replace(&mut core.tree, next);
                core.undo.push(current);
                clamp_selection(core);
                fx.tree_changed = true;
            }
        }
    }
    Ok(())
}

/// Insertion point for new blocks: just after the cursor block, or at
/// the front of an empty document.
fn insert_index(core: &Core) -> usize {
    if core.tree.is_empty() {
        0
    } else {
        core.selection.head.min(core.tree.len() - 1) + 1
    }
}

/// Selected block range clamped to the document, `None` when empty.
fn selected_blocks(core: &Core) -> Option<(usize, usize)> {
    if core.tree.is_empty() {
        return None;
    }
    let last = core.tree.len() - 1;
    let (lo, hi) = core.selection.ordered();
    Some((lo.min(last), hi.min(last)))
}

fn clamp_selection(core: &mut Core) {
    let last = core.tree.len().saturating_sub(1);
    core.selection = Selection {
        anchor: core.selection.anchor.min(last),
        head: core.selection.head.min(last),
    };
}

/// Mark toggle across the selection: if every run already carries the
/// mark it is removed everywhere, otherwise it is added everywhere.
fn toggle_mark(core: &mut Core, mark: Mark) -> bool {
    let Some((lo, hi)) = selected_blocks(core) else {
        return false;
    };

    let mut any_runs = false;
    let mut all_marked = true;
    for node in &core.tree.nodes[lo..=hi] {
        if let Some(runs) = node.runs() {
            for run in runs {
                any_runs = true;
                if !run.marks.contains(&mark) {
                    all_marked = false;
                }
            }
        }
    }
    if !any_runs {
        return false;
    }

    let mut changed = false;
    for node in &mut core.tree.nodes[lo..=hi] {
        if let Some(runs) = node.runs_mut() {
            for run in runs.iter_mut() {
                let delta = if all_marked {
                    run.marks.remove(&mark)
                } else {
                    run.marks.insert(mark)
                };
                changed |= delta;
            }
        }
    }
    changed
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Alignment;

    fn engine_with(text: &str) -> Engine {
        let mut e = Engine::with_text(text);
        e.drain_events(); // discard Created
        e
    }

    #[test]
    fn test_new_engine_queues_created() {
        let mut e = Engine::new();
        assert_eq!(e.drain_events(), vec![EngineEvent::Created]);
        assert!(e.is_alive());
    }

    #[test]
    fn test_with_text_one_paragraph_per_line() {
        let e = engine_with("alpha\nbeta");
        assert_eq!(e.tree().len(), 2);
        assert_eq!(e.to_text(), "alpha\nbeta");
    }

    #[test]
    fn test_toggle_bold_adds_then_removes() {
        let mut e = engine_with("hello");
        let bold = CommandChain::new().focus().toggle_mark(Mark::Bold);

        e.apply(&bold).unwrap();
        let marked = match &e.tree().nodes[0] {
            Node::Paragraph { runs, .. } => runs[0].marks.contains(&Mark::Bold),
            _ => false,
        };
        assert!(marked);

        e.apply(&bold).unwrap();
        let marked = match &e.tree().nodes[0] {
            Node::Paragraph { runs, .. } => runs[0].marks.contains(&Mark::Bold),
            _ => false,
        };
        assert!(!marked);
    }

    #[test]
    fn test_clear_formatting_idempotent() {
        let mut e = engine_with("hello");
        e.apply(&CommandChain::new().toggle_mark(Mark::Bold)).unwrap();

        e.apply(&CommandChain::new().unset_all_marks()).unwrap();
        let once = e.tree().clone();

        e.apply(&CommandChain::new().unset_all_marks()).unwrap();
        assert_eq!(e.tree(), &once);
    }

    #[test]
    fn test_insert_table_2x2_at_cursor() {
        let mut e = engine_with("intro");
        e.apply(&CommandChain::new().focus().insert_table(2, 2, false))
            .unwrap();

        assert_eq!(e.tree().len(), 2);
        match &e.tree().nodes[1] {
            Node::Table {
                with_header_row,
                rows,
            } => {
                assert!(!with_header_row);
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r.cells.len() == 2));
            }
            other => panic!("expected table, got {other:?}"),
        }
        // Cursor follows the inserted table.
        assert_eq!(e.selection(), Selection::caret(1));
    }

    #[test]
    fn test_insert_table_rejects_zero_dimensions() {
        let mut e = engine_with("intro");
        let err = e
            .apply(&CommandChain::new().insert_table(0, 3, false))
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyTable));
    }

    #[test]
    fn test_chain_is_atomic_on_failure() {
        let mut e = engine_with("hello");
        let before = e.tree().clone();

        // Valid toggle followed by an invalid table: nothing may apply.
        let chain = CommandChain::new()
            .toggle_mark(Mark::Bold)
            .insert_table(0, 0, false);
        assert!(e.apply(&chain).is_err());
        assert_eq!(e.tree(), &before);
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut e = engine_with("hello");
        let original = e.tree().clone();

        e.apply(&CommandChain::new().toggle_mark(Mark::Italic)).unwrap();
        let marked = e.tree().clone();
        assert_ne!(original, marked);

        e.apply(&CommandChain::new().undo()).unwrap();
        assert_eq!(e.tree(), &original);

        e.apply(&CommandChain::new().redo()).unwrap();
        assert_eq!(e.tree(), &marked);
    }

    #[test]
    fn test_undo_with_empty_history_is_harmless() {
        let mut e = engine_with("hello");
        let before = e.tree().clone();
        e.apply(&CommandChain::new().focus().undo()).unwrap();
        assert_eq!(e.tree(), &before);
    }

    #[test]
    fn test_set_alignment_and_font() {
        let mut e = engine_with("hello");
        e.apply(
            &CommandChain::new()
                .set_alignment(Alignment::Center)
                .set_font_family("serif"),
        )
        .unwrap();

        match &e.tree().nodes[0] {
            Node::Paragraph { align, font, .. } => {
                assert_eq!(*align, Alignment::Center);
                assert_eq!(font.as_deref(), Some("serif"));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_emits_updated_and_committed() {
        let mut e = engine_with("hello");
        e.apply(&CommandChain::new().toggle_mark(Mark::Bold)).unwrap();
        let events = e.drain_events();
        assert_eq!(
            events,
            vec![EngineEvent::Updated, EngineEvent::TransactionCommitted]
        );
    }

    #[test]
    fn test_noop_chain_commits_without_update() {
        let mut e = engine_with("hello");
        // Undo with empty history changes nothing.
        e.apply(&CommandChain::new().undo()).unwrap();
        assert_eq!(e.drain_events(), vec![EngineEvent::TransactionCommitted]);
    }

    #[test]
    fn test_focus_event_emitted_once() {
        let mut e = engine_with("hello");
        e.apply(&CommandChain::new().focus()).unwrap();
        let events = e.drain_events();
        assert!(events.contains(&EngineEvent::Focused));

        e.apply(&CommandChain::new().focus()).unwrap();
        let events = e.drain_events();
        assert!(!events.contains(&EngineEvent::Focused));
    }

    #[test]
    fn test_destroyed_engine_rejects_chains() {
        let mut e = engine_with("hello");
        e.destroy();
        assert_eq!(e.drain_events(), vec![EngineEvent::Destroyed]);

        let err = e.apply(&CommandChain::new().focus()).unwrap_err();
        assert!(matches!(err, EngineError::Destroyed));
    }

    #[test]
    fn test_tree_export_reimport_equivalence() {
        let mut e = engine_with("hello\nworld");
        e.apply(
            &CommandChain::new()
                .toggle_mark(Mark::Bold)
                .insert_table(2, 2, false),
        )
        .unwrap();

        let exported = e.to_tree_json().unwrap();

        let mut fresh = Engine::new();
        fresh.import_tree_json(&exported).unwrap();

        assert_eq!(fresh.tree(), e.tree());
        assert_eq!(fresh.to_text(), e.to_text());
    }

    #[test]
    fn test_import_malformed_tree_keeps_engine_usable() {
        let mut e = engine_with("hello");
        let before = e.tree().clone();

        let err = e.import_tree_json(b"{ not json").unwrap_err();
        assert!(matches!(err, EngineError::MalformedTree(_)));
        assert_eq!(e.drain_events(), vec![EngineEvent::ContentError]);

        // Content untouched, chains still apply.
        assert_eq!(e.tree(), &before);
        e.apply(&CommandChain::new().toggle_mark(Mark::Bold)).unwrap();
    }

    #[test]
    fn test_empty_document_exports_empty_artifacts() {
        let e = Engine::new();
        assert_eq!(e.to_text(), "");
        assert_eq!(e.to_html(), "");
        let tree: DocTree = serde_json::from_slice(&e.to_tree_json().unwrap()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_text_into_empty_document() {
        let mut e = Engine::new();
        e.drain_events();
        e.apply(&CommandChain::new().insert_text("first words")).unwrap();
        assert_eq!(e.to_text(), "first words");
    }

    #[test]
    fn test_selection_clamped() {
        let mut e = engine_with("a\nb");
        e.set_selection(Selection::caret(99));
        assert_eq!(e.selection(), Selection::caret(1));
        assert_eq!(e.drain_events(), vec![EngineEvent::SelectionUpdated]);
    }
}
