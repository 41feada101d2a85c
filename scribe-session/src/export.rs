//! Content serialization for download.
//!
//! An export artifact is a transient in-memory blob plus a filename,
//! derived from the engine content at the moment of export and handed
//! straight to the client download boundary. Nothing is persisted
//! server-side. Print is not an export format: it delegates to the
//! host print facility against the rendered view.

use scribe_engine::{Engine, EngineError};

/// Byte-producing export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Flattened plain text, no markup.
    Text,
    /// Structured document tree, re-importable by a compatible engine.
    Json,
    /// Styled markup for viewing/printing outside the engine.
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => ".txt",
            ExportFormat::Json => ".json",
            ExportFormat::Html => ".html",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Json => "application/json",
            ExportFormat::Html => "text/html",
        }
    }
}

/// A downloadable blob. Discarded once the save has been triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize current engine content into the requested encoding.
/// An empty document yields an empty-content artifact; that is
/// accepted behavior, not an error.
pub fn serialize(
    engine: &Engine,
    format: ExportFormat,
    title: &str,
) -> Result<ExportArtifact, EngineError> {
    let bytes = match format {
        ExportFormat::Text => engine.to_text().into_bytes(),
        ExportFormat::Json => engine.to_tree_json()?,
        ExportFormat::Html => engine.to_html().into_bytes(),
    };
    Ok(ExportArtifact {
        filename: format!("{title}{}", format.extension()),
        mime: format.mime(),
        bytes,
    })
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_engine::{CommandChain, Mark};

    #[test]
    fn test_filename_from_title_and_extension() {
        let engine = Engine::with_text("hello");
        let artifact = serialize(&engine, ExportFormat::Text, "Untitled Document").unwrap();
        assert_eq!(artifact.filename, "Untitled Document.txt");
        assert_eq!(artifact.mime, "text/plain");
    }

    #[test]
    fn test_text_export_flattens_content() {
        let engine = Engine::with_text("alpha\nbeta");
        let artifact = serialize(&engine, ExportFormat::Text, "doc").unwrap();
        assert_eq!(artifact.bytes, b"alpha\nbeta");
    }

    #[test]
    fn test_html_export_carries_marks() {
        let mut engine = Engine::with_text("hello");
        engine
            .apply(&CommandChain::new().toggle_mark(Mark::Bold))
            .unwrap();
        let artifact = serialize(&engine, ExportFormat::Html, "doc").unwrap();
        let html = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(html, "<p><strong>hello</strong></p>");
    }

    #[test]
    fn test_json_export_reimports() {
        let mut engine = Engine::with_text("hello");
        engine
            .apply(&CommandChain::new().insert_table(2, 2, false))
            .unwrap();

        let artifact = serialize(&engine, ExportFormat::Json, "doc").unwrap();

        let mut fresh = Engine::new();
        fresh.import_tree_json(&artifact.bytes).unwrap();
        assert_eq!(fresh.tree(), engine.tree());
    }

    #[test]
    fn test_empty_document_yields_empty_artifact() {
        let engine = Engine::new();
        let artifact = serialize(&engine, ExportFormat::Text, "empty").unwrap();
        assert!(artifact.bytes.is_empty());
        assert_eq!(artifact.filename, "empty.txt");
    }
}
