//! Shared page-layout accessor.
//!
//! Margins are replicated room state: any client may change them, and
//! the document view reads them reactively to compute padding. Absence
//! means "use the default" — 56 units each side.

use scribe_collab::SharedDoc;

/// Default page margin when no client has written one.
pub const DEFAULT_MARGIN: f64 = 56.0;

/// Computed padding for the document view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub padding_left: f64,
    pub padding_right: f64,
}

/// Read the shared margins, applying defaults for absent values.
/// Reads may be briefly stale relative to a just-issued local write
/// until the local echo arrives; that is inherited store behavior.
pub fn page_layout(shared: &SharedDoc) -> PageLayout {
    PageLayout {
        padding_left: shared.left_margin().unwrap_or(DEFAULT_MARGIN),
        padding_right: shared.right_margin().unwrap_or(DEFAULT_MARGIN),
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let shared = SharedDoc::new();
        let layout = page_layout(&shared);
        assert_eq!(layout.padding_left, 56.0);
        assert_eq!(layout.padding_right, 56.0);
    }

    #[test]
    fn test_written_margin_wins_over_default() {
        let shared = SharedDoc::new();
        shared.set_left_margin(120.0);

        let layout = page_layout(&shared);
        assert_eq!(layout.padding_left, 120.0);
        assert_eq!(layout.padding_right, 56.0);
    }

    #[test]
    fn test_remote_margin_change_visible_after_echo() {
        let theirs = SharedDoc::new();
        let ours = SharedDoc::new();

        let delta = theirs.set_right_margin(90.0);
        ours.apply_update(&delta).unwrap();

        assert_eq!(page_layout(&ours).padding_right, 90.0);
    }
}
