//! Document tree: block nodes, text runs, and character marks.
//!
//! The tree is the unit of export and import — serializing it to JSON
//! and feeding that JSON into a fresh engine reproduces the content
//! exactly (same text, same mark/node structure).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A character-level mark applied to a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
}

/// Block-level text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A contiguous piece of text carrying one set of marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub marks: BTreeSet<Mark>,
}

impl TextRun {
    /// An unmarked run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: BTreeSet::new(),
        }
    }

    /// A run carrying the given marks.
    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }
}

/// One cell of a table row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

/// One row of a table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Paragraph {
        #[serde(default)]
        align: Alignment,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(default)]
        runs: Vec<TextRun>,
    },
    Heading {
        level: u8,
        #[serde(default)]
        align: Alignment,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(default)]
        runs: Vec<TextRun>,
    },
    Table {
        #[serde(default)]
        with_header_row: bool,
        rows: Vec<TableRow>,
    },
}

impl Node {
    /// An empty paragraph with default styling.
    pub fn empty_paragraph() -> Self {
        Node::Paragraph {
            align: Alignment::default(),
            font: None,
            runs: Vec::new(),
        }
    }

    /// Text runs of this block, if it carries runs directly.
    /// Tables hold their runs inside cells and return `None` here.
    pub fn runs_mut(&mut self) -> Option<&mut Vec<TextRun>> {
        match self {
            Node::Paragraph { runs, .. } | Node::Heading { runs, .. } => Some(runs),
            Node::Table { .. } => None,
        }
    }

    /// Read-only counterpart of [`Node::runs_mut`].
    pub fn runs(&self) -> Option<&[TextRun]> {
        match self {
            Node::Paragraph { runs, .. } | Node::Heading { runs, .. } => Some(runs),
            Node::Table { .. } => None,
        }
    }
}

/// The whole document: an ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocTree {
    pub nodes: Vec<Node>,
}

impl DocTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Flattened plain-text extraction: runs concatenated, table cells
    /// tab-separated, blocks newline-separated. No markup survives.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match node {
                Node::Paragraph { runs, .. } | Node::Heading { runs, .. } => {
                    lines.push(runs.iter().map(|r| r.text.as_str()).collect::<String>());
                }
                Node::Table { rows, .. } => {
                    for row in rows {
                        let cells: Vec<String> = row
                            .cells
                            .iter()
                            .map(|c| c.runs.iter().map(|r| r.text.as_str()).collect())
                            .collect();
                        lines.push(cells.join("\t"));
                    }
                }
            }
        }
        lines.join("\n")
    }

    /// Styled markup rendering, suitable for viewing outside the engine.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Paragraph { align, font, runs } => {
                    block_open(&mut out, "p", *align, font.as_deref());
                    runs_html(&mut out, runs);
                    out.push_str("</p>");
                }
                Node::Heading {
                    level,
                    align,
                    font,
                    runs,
                } => {
                    let tag = heading_tag(*level);
                    block_open(&mut out, tag, *align, font.as_deref());
                    runs_html(&mut out, runs);
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                Node::Table {
                    with_header_row,
                    rows,
                } => {
                    out.push_str("<table>");
                    for (i, row) in rows.iter().enumerate() {
                        let cell_tag = if *with_header_row && i == 0 { "th" } else { "td" };
                        out.push_str("<tr>");
                        for cell in &row.cells {
                            out.push('<');
                            out.push_str(cell_tag);
                            out.push('>');
                            runs_html(&mut out, &cell.runs);
                            out.push_str("</");
                            out.push_str(cell_tag);
                            out.push('>');
                        }
                        out.push_str("</tr>");
                    }
                    out.push_str("</table>");
                }
            }
        }
        out
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        _ => "h3",
    }
}

fn block_open(out: &mut String, tag: &str, align: Alignment, font: Option<&str>) {
    out.push('<');
    out.push_str(tag);
    let mut style = String::new();
    if align != Alignment::Left {
        style.push_str("text-align:");
        style.push_str(match align {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        });
        style.push(';');
    }
    if let Some(font) = font {
        style.push_str("font-family:");
        style.push_str(font);
        style.push(';');
    }
    if !style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&style);
        out.push('"');
    }
    out.push('>');
}

fn runs_html(out: &mut String, runs: &[TextRun]) {
    for run in runs {
        // Open mark tags in a stable order (BTreeSet iteration).
        for mark in &run.marks {
            out.push_str(mark_open(*mark));
        }
        out.push_str(&escape_html(&run.text));
        for mark in run.marks.iter().rev() {
            out.push_str(mark_close(*mark));
        }
    }
}

fn mark_open(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "<strong>",
        Mark::Italic => "<em>",
        Mark::Underline => "<u>",
        Mark::Strike => "<s>",
    }
}

fn mark_close(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "</strong>",
        Mark::Italic => "</em>",
        Mark::Underline => "</u>",
        Mark::Strike => "</s>",
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DocTree {
        DocTree {
            nodes: vec![
                Node::Heading {
                    level: 1,
                    align: Alignment::Center,
                    font: None,
                    runs: vec![TextRun::plain("Title")],
                },
                Node::Paragraph {
                    align: Alignment::Left,
                    font: Some("serif".into()),
                    runs: vec![
                        TextRun::plain("Hello "),
                        TextRun::marked("world", [Mark::Bold, Mark::Italic]),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_to_text_flattens_runs() {
        let tree = sample_tree();
        assert_eq!(tree.to_text(), "Title\nHello world");
    }

    #[test]
    fn test_to_text_table_cells_tab_separated() {
        let tree = DocTree {
            nodes: vec![Node::Table {
                with_header_row: false,
                rows: vec![TableRow {
                    cells: vec![
                        TableCell {
                            runs: vec![TextRun::plain("a")],
                        },
                        TableCell {
                            runs: vec![TextRun::plain("b")],
                        },
                    ],
                }],
            }],
        };
        assert_eq!(tree.to_text(), "a\tb");
    }

    #[test]
    fn test_to_html_marks_nested_in_order() {
        let tree = DocTree {
            nodes: vec![Node::Paragraph {
                align: Alignment::default(),
                font: None,
                runs: vec![TextRun::marked("x", [Mark::Italic, Mark::Bold])],
            }],
        };
        // BTreeSet orders Bold before Italic regardless of insertion order.
        assert_eq!(tree.to_html(), "<p><strong><em>x</em></strong></p>");
    }

    #[test]
    fn test_to_html_alignment_and_font_styles() {
        let tree = sample_tree();
        let html = tree.to_html();
        assert!(html.contains("<h1 style=\"text-align:center;\">"));
        assert!(html.contains("<p style=\"font-family:serif;\">"));
    }

    #[test]
    fn test_to_html_escapes_text() {
        let tree = DocTree {
            nodes: vec![Node::Paragraph {
                align: Alignment::default(),
                font: None,
                runs: vec![TextRun::plain("a < b & c")],
            }],
        };
        assert_eq!(tree.to_html(), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_header_row_uses_th() {
        let tree = DocTree {
            nodes: vec![Node::Table {
                with_header_row: true,
                rows: vec![
                    TableRow {
                        cells: vec![TableCell {
                            runs: vec![TextRun::plain("h")],
                        }],
                    },
                    TableRow {
                        cells: vec![TableCell {
                            runs: vec![TextRun::plain("d")],
                        }],
                    },
                ],
            }],
        };
        let html = tree.to_html();
        assert!(html.contains("<th>h</th>"));
        assert!(html.contains("<td>d</td>"));
    }

    #[test]
    fn test_tree_json_roundtrip_preserves_structure() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: DocTree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }

    #[test]
    fn test_empty_tree_yields_empty_text() {
        let tree = DocTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.to_text(), "");
        assert_eq!(tree.to_html(), "");
    }
}
