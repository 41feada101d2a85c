//! Edit primitives and the chain builder.
//!
//! A [`CommandChain`] is an ordered batch of [`EditOp`]s committed
//! atomically by [`Engine::apply`](crate::Engine::apply): either every
//! primitive applies, or the engine is left untouched.

use crate::node::{Alignment, Mark};

/// A single primitive edit operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Give the engine keyboard focus.
    Focus,
    /// Toggle a character mark across the current selection.
    ToggleMark(Mark),
    /// Remove every mark from the current selection.
    UnsetAllMarks,
    /// Set block alignment on the selected blocks.
    SetAlignment(Alignment),
    /// Set the font family on the selected blocks.
    SetFontFamily(String),
    /// Insert a table at the cursor. Zero rows or columns is rejected
    /// by the engine and aborts the whole chain.
    InsertTable {
        rows: u32,
        cols: u32,
        with_header_row: bool,
    },
    /// Append text at the cursor block.
    InsertText(String),
    /// Step back one entry in the undo history. No-op when empty.
    Undo,
    /// Reapply the most recently undone entry. No-op when empty.
    Redo,
}

/// Builder for an atomic batch of edits.
#[derive(Debug, Clone, Default)]
pub struct CommandChain {
    ops: Vec<EditOp>,
}

impl CommandChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(mut self) -> Self {
        self.ops.push(EditOp::Focus);
        self
    }

    pub fn toggle_mark(mut self, mark: Mark) -> Self {
        self.ops.push(EditOp::ToggleMark(mark));
        self
    }

    pub fn unset_all_marks(mut self) -> Self {
        self.ops.push(EditOp::UnsetAllMarks);
        self
    }

    pub fn set_alignment(mut self, align: Alignment) -> Self {
        self.ops.push(EditOp::SetAlignment(align));
        self
    }

    pub fn set_font_family(mut self, family: impl Into<String>) -> Self {
        self.ops.push(EditOp::SetFontFamily(family.into()));
        self
    }

    pub fn insert_table(mut self, rows: u32, cols: u32, with_header_row: bool) -> Self {
        self.ops.push(EditOp::InsertTable {
            rows,
            cols,
            with_header_row,
        });
        self
    }

    pub fn insert_text(mut self, text: impl Into<String>) -> Self {
        self.ops.push(EditOp::InsertText(text.into()));
        self
    }

    pub fn undo(mut self) -> Self {
        self.ops.push(EditOp::Undo);
        self
    }

    pub fn redo(mut self) -> Self {
        self.ops.push(EditOp::Redo);
        self
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ===================================================================
// Tests
// ===================================================================
