//! Rich-text document model.
//!
//! A document is a flat list of paragraphs, each containing styled text
//! runs. Formatting operations are pure transformations over a tree plus an
//! explicit selection; the live mutable instance is owned by the editing
//! surface in [`crate::host`].

mod format;
mod snapshot;

pub use format::{DocPoint, DocRange, FormatChange, Mark, SelectionFormat, apply_format, selection_format};
pub use snapshot::{ParseError, SNAPSHOT_VERSION, parse_snapshot, serialize_snapshot};

use serde::{Deserialize, Serialize};

/// Boolean character-level formatting attributes carried by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkSet {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(v: &bool) -> bool {
    !v
}

impl MarkSet {
    /// Check whether a single mark is set.
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
        }
    }

    /// Set or clear a single mark.
    pub fn set(&mut self, mark: Mark, value: bool) {
        match mark {
            Mark::Bold => self.bold = value,
            Mark::Italic => self.italic = value,
            Mark::Underline => self.underline = value,
            Mark::Strikethrough => self.strikethrough = value,
        }
    }
}

/// Inline style overrides on a run. `None` means "inherit from the element".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Text color as a hex string, e.g. `#ff0000`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RunStyle {
    /// True if no override is set.
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}

/// A contiguous span of text with uniform marks and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub marks: MarkSet,
    #[serde(default)]
    pub style: RunStyle,
}

impl TextRun {
    /// Create a plain run with no marks or style overrides.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: MarkSet::default(),
            style: RunStyle::default(),
        }
    }

    /// Character length of the run text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this run can be merged with `other` (same attributes).
    fn same_attributes(&self, other: &TextRun) -> bool {
        self.marks == other.marks && self.style == other.style
    }
}

/// A block-level paragraph node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Create a paragraph holding a single run.
    pub fn from_run(run: TextRun) -> Self {
        Self { runs: vec![run] }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Total character length of the paragraph.
    pub fn char_len(&self) -> usize {
        self.runs.iter().map(|r| r.char_len()).sum()
    }

    /// Ensure a run boundary exists at the given character offset.
    ///
    /// Returns the index of the run that starts at `offset`. An offset at
    /// or past the end of the paragraph returns `runs.len()`.
    pub(crate) fn split_at(&mut self, offset: usize) -> usize {
        let mut consumed = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].char_len();
            if offset == consumed {
                return i;
            }
            if offset < consumed + len {
                let local = offset - consumed;
                let byte = self.runs[i]
                    .text
                    .char_indices()
                    .nth(local)
                    .map(|(b, _)| b)
                    .unwrap_or(self.runs[i].text.len());
                let tail = self.runs[i].text.split_off(byte);
                let mut new_run = self.runs[i].clone();
                new_run.text = tail;
                self.runs.insert(i + 1, new_run);
                return i + 1;
            }
            consumed += len;
        }
        self.runs.len()
    }

    /// Merge adjacent runs with identical attributes and drop empty runs.
    pub(crate) fn normalize(&mut self) {
        self.runs.retain(|r| !r.text.is_empty());
        let mut i = 0;
        while i + 1 < self.runs.len() {
            if self.runs[i].same_attributes(&self.runs[i + 1]) {
                let tail = self.runs.remove(i + 1);
                self.runs[i].text.push_str(&tail.text);
            } else {
                i += 1;
            }
        }
    }
}

/// An in-memory rich-text document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    pub paragraphs: Vec<Paragraph>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl DocumentTree {
    /// An empty document: one paragraph with no runs.
    pub fn empty() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }

    /// Wrap raw text into a single paragraph with a single unformatted run.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            paragraphs: vec![Paragraph::from_run(TextRun::plain(text))],
        }
    }

    /// Build a tree from element content: parse it as a snapshot, and fall
    /// back to plain text when that fails. This never fails.
    pub fn from_content(content: &str) -> Self {
        match parse_snapshot(content) {
            Ok(tree) => tree,
            Err(err) => {
                log::debug!("content is not a snapshot ({err}), treating as plain text");
                Self::from_plain_text(content)
            }
        }
    }

    /// Full document text, paragraphs joined with newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Insert text (no newlines) at a point, inheriting the attributes of
    /// the run preceding the insertion point.
    pub fn insert_text(&mut self, point: DocPoint, text: &str) {
        let Some(paragraph) = self.paragraphs.get_mut(point.paragraph) else {
            return;
        };
        let offset = point.offset.min(paragraph.char_len());
        let at = paragraph.split_at(offset);
        let mut run = if at > 0 {
            let mut r = paragraph.runs[at - 1].clone();
            r.text.clear();
            r
        } else if let Some(next) = paragraph.runs.first() {
            let mut r = next.clone();
            r.text.clear();
            r
        } else {
            TextRun::plain("")
        };
        run.text.push_str(text);
        paragraph.runs.insert(at, run);
        paragraph.normalize();
    }

    /// Split a paragraph in two at a point (the Enter key).
    pub fn split_paragraph(&mut self, point: DocPoint) {
        let Some(paragraph) = self.paragraphs.get_mut(point.paragraph) else {
            return;
        };
        let offset = point.offset.min(paragraph.char_len());
        let at = paragraph.split_at(offset);
        let tail_runs = paragraph.runs.split_off(at);
        self.paragraphs
            .insert(point.paragraph + 1, Paragraph { runs: tail_runs });
    }

    /// Delete all text inside a range. A range spanning paragraphs joins
    /// the boundary paragraphs together.
    pub fn delete_range(&mut self, range: &DocRange) {
        let Some((start, end)) = range.normalized(self) else {
            return;
        };
        if start == end {
            return;
        }
        if start.paragraph == end.paragraph {
            let paragraph = &mut self.paragraphs[start.paragraph];
            let from = paragraph.split_at(start.offset);
            let to = paragraph.split_at(end.offset);
            paragraph.runs.drain(from..to);
            paragraph.normalize();
            return;
        }
        // Trim the start paragraph, trim the end paragraph, join them, and
        // drop everything in between.
        let end_paragraph = &mut self.paragraphs[end.paragraph];
        let keep_from = end_paragraph.split_at(end.offset);
        let tail: Vec<TextRun> = end_paragraph.runs.split_off(keep_from);

        let start_paragraph = &mut self.paragraphs[start.paragraph];
        let cut_from = start_paragraph.split_at(start.offset);
        start_paragraph.runs.truncate(cut_from);
        start_paragraph.runs.extend(tail);
        start_paragraph.normalize();

        self.paragraphs.drain(start.paragraph + 1..=end.paragraph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_wraps_single_run() {
        let tree = DocumentTree::from_plain_text("hello\nworld");
        assert_eq!(tree.paragraphs.len(), 1);
        assert_eq!(tree.paragraphs[0].runs.len(), 1);
        assert_eq!(tree.paragraphs[0].text(), "hello\nworld");
    }

    #[test]
    fn test_split_at_mid_run() {
        let mut paragraph = Paragraph::from_run(TextRun::plain("hello"));
        let at = paragraph.split_at(2);
        assert_eq!(at, 1);
        assert_eq!(paragraph.runs[0].text, "he");
        assert_eq!(paragraph.runs[1].text, "llo");
    }

    #[test]
    fn test_split_at_existing_boundary() {
        let mut paragraph = Paragraph {
            runs: vec![TextRun::plain("ab"), TextRun::plain("cd")],
        };
        let at = paragraph.split_at(2);
        assert_eq!(at, 1);
        assert_eq!(paragraph.runs.len(), 2);
    }

    #[test]
    fn test_split_at_multibyte() {
        let mut paragraph = Paragraph::from_run(TextRun::plain("héllo"));
        paragraph.split_at(3);
        assert_eq!(paragraph.runs[0].text, "hél");
        assert_eq!(paragraph.runs[1].text, "lo");
    }

    #[test]
    fn test_normalize_merges_equal_runs() {
        let mut paragraph = Paragraph {
            runs: vec![
                TextRun::plain("ab"),
                TextRun::plain(""),
                TextRun::plain("cd"),
            ],
        };
        paragraph.normalize();
        assert_eq!(paragraph.runs.len(), 1);
        assert_eq!(paragraph.runs[0].text, "abcd");
    }

    #[test]
    fn test_normalize_keeps_distinct_runs() {
        let mut bold = TextRun::plain("ab");
        bold.marks.bold = true;
        let mut paragraph = Paragraph {
            runs: vec![bold, TextRun::plain("cd")],
        };
        paragraph.normalize();
        assert_eq!(paragraph.runs.len(), 2);
    }

    #[test]
    fn test_insert_text_inherits_marks() {
        let mut run = TextRun::plain("bold");
        run.marks.bold = true;
        let mut tree = DocumentTree {
            paragraphs: vec![Paragraph::from_run(run)],
        };
        tree.insert_text(DocPoint::new(0, 4), "er");
        assert_eq!(tree.paragraphs[0].runs.len(), 1);
        assert_eq!(tree.paragraphs[0].runs[0].text, "bolder");
        assert!(tree.paragraphs[0].runs[0].marks.bold);
    }

    #[test]
    fn test_split_paragraph() {
        let mut tree = DocumentTree::from_plain_text("hello world");
        tree.split_paragraph(DocPoint::new(0, 5));
        assert_eq!(tree.paragraphs.len(), 2);
        assert_eq!(tree.paragraphs[0].text(), "hello");
        assert_eq!(tree.paragraphs[1].text(), " world");
    }

    #[test]
    fn test_delete_range_within_paragraph() {
        let mut tree = DocumentTree::from_plain_text("hello world");
        tree.delete_range(&DocRange::new(DocPoint::new(0, 5), DocPoint::new(0, 11)));
        assert_eq!(tree.plain_text(), "hello");
    }

    #[test]
    fn test_delete_range_across_paragraphs() {
        let mut tree = DocumentTree::from_plain_text("abc");
        tree.split_paragraph(DocPoint::new(0, 2));
        tree.split_paragraph(DocPoint::new(1, 1));
        assert_eq!(tree.paragraphs.len(), 3);
        // Delete from middle of first paragraph to start of last.
        tree.delete_range(&DocRange::new(DocPoint::new(0, 1), DocPoint::new(2, 0)));
        assert_eq!(tree.plain_text(), "a");
        assert_eq!(tree.paragraphs.len(), 1);
    }
}
