//! Selection ranges and pure formatting operations.

use super::{DocumentTree, TextRun};
use serde::{Deserialize, Serialize};

/// A position inside a document: paragraph index plus character offset
/// within that paragraph's concatenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocPoint {
    pub paragraph: usize,
    pub offset: usize,
}

impl DocPoint {
    pub fn new(paragraph: usize, offset: usize) -> Self {
        Self { paragraph, offset }
    }
}

/// A selection range between two points. `anchor` and `focus` may be in
/// either order; operations normalize before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRange {
    pub anchor: DocPoint,
    pub focus: DocPoint,
}

impl DocRange {
    pub fn new(anchor: DocPoint, focus: DocPoint) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed range (caret) at a single point.
    pub fn caret(point: DocPoint) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Clamp both ends to the tree and order them start-before-end.
    /// Returns `None` for a tree with no paragraphs.
    pub fn normalized(&self, tree: &DocumentTree) -> Option<(DocPoint, DocPoint)> {
        if tree.paragraphs.is_empty() {
            return None;
        }
        let clamp = |point: DocPoint| {
            let paragraph = point.paragraph.min(tree.paragraphs.len() - 1);
            let offset = point.offset.min(tree.paragraphs[paragraph].char_len());
            DocPoint { paragraph, offset }
        };
        let a = clamp(self.anchor);
        let b = clamp(self.focus);
        Some(if a <= b { (a, b) } else { (b, a) })
    }
}

/// A boolean character-level formatting attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl Mark {
    /// Snapshot wire name of the mark.
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strikethrough => "strikethrough",
        }
    }

    /// Parse a snapshot wire name. Unknown names yield `None` and are
    /// ignored by the snapshot parser.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Mark::Bold),
            "italic" => Some(Mark::Italic),
            "underline" => Some(Mark::Underline),
            "strikethrough" => Some(Mark::Strikethrough),
            _ => None,
        }
    }
}

/// A formatting change applied to a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatChange {
    /// Toggle a boolean mark over the whole range: if every character in
    /// the range already carries it, remove it everywhere; otherwise apply
    /// it everywhere.
    Toggle(Mark),
    SetFontFamily(String),
    /// Font size in pixels.
    SetFontSize(f64),
    /// Text color as a hex string.
    SetColor(String),
}

/// Uniform-format summary of a selection, broadcast to toolbars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Apply a formatting change to the selected range, returning a new tree.
///
/// A collapsed or out-of-tree range is a no-op and returns an equal tree.
pub fn apply_format(tree: &DocumentTree, range: &DocRange, change: &FormatChange) -> DocumentTree {
    let mut result = tree.clone();
    let Some((start, end)) = range.normalized(tree) else {
        return result;
    };
    if start == end {
        return result;
    }

    match change {
        FormatChange::Toggle(mark) => {
            let value = !range_has_mark(tree, start, end, *mark);
            for_runs_in_range(&mut result, start, end, |run| run.marks.set(*mark, value));
        }
        FormatChange::SetFontFamily(family) => {
            for_runs_in_range(&mut result, start, end, |run| {
                run.style.font_family = Some(family.clone());
            });
        }
        FormatChange::SetFontSize(px) => {
            for_runs_in_range(&mut result, start, end, |run| {
                run.style.font_size = Some(*px);
            });
        }
        FormatChange::SetColor(color) => {
            for_runs_in_range(&mut result, start, end, |run| {
                run.style.color = Some(color.clone());
            });
        }
    }
    result
}

/// Query which marks apply uniformly across the whole non-empty selection.
///
/// A collapsed range, or one containing no text, reports all marks off.
pub fn selection_format(tree: &DocumentTree, range: &DocRange) -> SelectionFormat {
    let Some((start, end)) = range.normalized(tree) else {
        return SelectionFormat::default();
    };
    if start == end || !range_has_text(tree, start, end) {
        return SelectionFormat::default();
    }
    SelectionFormat {
        bold: range_has_mark(tree, start, end, Mark::Bold),
        italic: range_has_mark(tree, start, end, Mark::Italic),
        underline: range_has_mark(tree, start, end, Mark::Underline),
    }
}

/// Paragraph-local character window of a normalized range.
fn paragraph_window(
    tree: &DocumentTree,
    paragraph: usize,
    start: DocPoint,
    end: DocPoint,
) -> (usize, usize) {
    let from = if paragraph == start.paragraph {
        start.offset
    } else {
        0
    };
    let to = if paragraph == end.paragraph {
        end.offset
    } else {
        tree.paragraphs[paragraph].char_len()
    };
    (from, to)
}

/// Whether the range contains at least one character.
fn range_has_text(tree: &DocumentTree, start: DocPoint, end: DocPoint) -> bool {
    (start.paragraph..=end.paragraph).any(|p| {
        let (from, to) = paragraph_window(tree, p, start, end);
        to > from
    })
}

/// Whether every character in the range carries the mark.
fn range_has_mark(tree: &DocumentTree, start: DocPoint, end: DocPoint, mark: Mark) -> bool {
    let mut saw_text = false;
    for p in start.paragraph..=end.paragraph {
        let (from, to) = paragraph_window(tree, p, start, end);
        let mut consumed = 0;
        for run in &tree.paragraphs[p].runs {
            let len = run.char_len();
            let overlap_from = from.max(consumed);
            let overlap_to = to.min(consumed + len);
            if overlap_to > overlap_from {
                saw_text = true;
                if !run.marks.has(mark) {
                    return false;
                }
            }
            consumed += len;
        }
    }
    saw_text
}

/// Split runs at the range boundaries and apply `f` to every run fully
/// inside the range, then re-normalize the touched paragraphs.
fn for_runs_in_range(
    tree: &mut DocumentTree,
    start: DocPoint,
    end: DocPoint,
    mut f: impl FnMut(&mut TextRun),
) {
    for p in start.paragraph..=end.paragraph {
        let (from, to) = paragraph_window(tree, p, start, end);
        if to <= from {
            continue;
        }
        let paragraph = &mut tree.paragraphs[p];
        let i0 = paragraph.split_at(from);
        let i1 = paragraph.split_at(to);
        for run in &mut paragraph.runs[i0..i1] {
            f(run);
        }
        paragraph.normalize();
    }
}
