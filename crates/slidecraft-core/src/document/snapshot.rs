//! Serialized document snapshot codec.
//!
//! Snapshots are versioned JSON trees of `paragraph` and `text` nodes,
//! persisted as element content. Parsing is deliberately lenient so the
//! format stays forward-readable: unknown node types, marks, and style keys
//! are skipped rather than rejected. Only structural garbage (not a JSON
//! object, no root node) is a [`ParseError`]; callers recover from that by
//! wrapping the raw content as plain text.

use super::{DocumentTree, Mark, MarkSet, Paragraph, RunStyle, TextRun};
use serde_json::{Value, json};
use thiserror::Error;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A snapshot that could not be understood at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has no root node")]
    MissingRoot,
    #[error("snapshot root has no children array")]
    MalformedRoot,
}

/// Serialize a document tree into a snapshot string.
///
/// The output captures the full node hierarchy with all marks and style
/// overrides. Re-parsing it yields a tree describing the same rendered
/// content (run boundaries may differ after normalization, bytes may not).
pub fn serialize_snapshot(tree: &DocumentTree) -> String {
    let children: Vec<Value> = tree
        .paragraphs
        .iter()
        .map(|paragraph| {
            let runs: Vec<Value> = paragraph.runs.iter().map(run_to_value).collect();
            json!({ "type": "paragraph", "children": runs })
        })
        .collect();
    let snapshot = json!({
        "version": SNAPSHOT_VERSION,
        "root": { "type": "root", "children": children },
    });
    snapshot.to_string()
}

fn run_to_value(run: &TextRun) -> Value {
    let mut node = json!({ "type": "text", "text": run.text });
    let marks: Vec<&str> = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
    ]
    .iter()
    .filter(|m| run.marks.has(**m))
    .map(|m| m.name())
    .collect();
    if !marks.is_empty() {
        node["marks"] = json!(marks);
    }
    if !run.style.is_empty() {
        let mut style = serde_json::Map::new();
        if let Some(family) = &run.style.font_family {
            style.insert("font-family".into(), json!(family));
        }
        if let Some(px) = run.style.font_size {
            style.insert("font-size".into(), json!(px));
        }
        if let Some(color) = &run.style.color {
            style.insert("color".into(), json!(color));
        }
        node["style"] = Value::Object(style);
    }
    node
}

/// Parse a snapshot string into a document tree.
pub fn parse_snapshot(input: &str) -> Result<DocumentTree, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let root = value.get("root").ok_or(ParseError::MissingRoot)?;
    let children = root
        .get("children")
        .and_then(|c| c.as_array())
        .ok_or(ParseError::MalformedRoot)?;

    let mut paragraphs = Vec::new();
    for node in children {
        let node_type = node.get("type").and_then(|t| t.as_str()).unwrap_or("");
        match node_type {
            "paragraph" => paragraphs.push(parse_paragraph(node)),
            other => {
                log::debug!("skipping unknown block node type {other:?}");
            }
        }
    }
    if paragraphs.is_empty() {
        paragraphs.push(Paragraph::default());
    }
    Ok(DocumentTree { paragraphs })
}

fn parse_paragraph(node: &Value) -> Paragraph {
    let mut runs = Vec::new();
    let children = node
        .get("children")
        .and_then(|c| c.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for child in children {
        let node_type = child.get("type").and_then(|t| t.as_str()).unwrap_or("");
        if node_type != "text" {
            log::debug!("skipping unknown inline node type {node_type:?}");
            continue;
        }
        let Some(text) = child.get("text").and_then(|t| t.as_str()) else {
            continue;
        };
        runs.push(TextRun {
            text: text.to_string(),
            marks: parse_marks(child.get("marks")),
            style: parse_style(child.get("style")),
        });
    }
    Paragraph { runs }
}

fn parse_marks(value: Option<&Value>) -> MarkSet {
    let mut marks = MarkSet::default();
    let Some(names) = value.and_then(|v| v.as_array()) else {
        return marks;
    };
    for name in names.iter().filter_map(|n| n.as_str()) {
        // Unknown mark names are ignored for forward compatibility.
        if let Some(mark) = Mark::from_name(name) {
            marks.set(mark, true);
        }
    }
    marks
}

fn parse_style(value: Option<&Value>) -> RunStyle {
    let Some(style) = value.and_then(|v| v.as_object()) else {
        return RunStyle::default();
    };
    RunStyle {
        font_family: style
            .get("font-family")
            .and_then(|v| v.as_str())
            .map(String::from),
        font_size: style.get("font-size").and_then(|v| v.as_f64()),
        color: style.get("color").and_then(|v| v.as_str()).map(String::from),
    }
}
