//! The live editing surface for one element.

use crate::bus::{FormatCommand, FormatTarget};
use crate::document::{
    DocPoint, DocRange, DocumentTree, SelectionFormat, apply_format, selection_format,
    serialize_snapshot,
};

/// Owns the mutable document tree of an element while it is in edit mode.
///
/// The tree has no external aliasing: commands and keystrokes arrive here,
/// and the scene store only sees a serialized snapshot when editing ends.
#[derive(Debug)]
pub struct EditingSurface {
    element_id: String,
    tree: DocumentTree,
    selection: DocRange,
}

impl EditingSurface {
    /// Build a surface from element content. Content that does not parse
    /// as a snapshot is wrapped as plain text, so this never fails. The
    /// caret starts at the end of the document.
    pub fn new(element_id: impl Into<String>, content: &str) -> Self {
        let tree = DocumentTree::from_content(content);
        let last = tree.paragraphs.len() - 1;
        let caret = DocPoint::new(last, tree.paragraphs[last].char_len());
        Self {
            element_id: element_id.into(),
            tree,
            selection: DocRange::caret(caret),
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn selection(&self) -> &DocRange {
        &self.selection
    }

    /// Move the selection, returning the format summary to broadcast.
    pub fn set_selection(&mut self, range: DocRange) -> SelectionFormat {
        self.selection = range;
        self.current_format()
    }

    /// Select the whole document.
    pub fn select_all(&mut self) -> SelectionFormat {
        let last = self.tree.paragraphs.len() - 1;
        let end = DocPoint::new(last, self.tree.paragraphs[last].char_len());
        self.set_selection(DocRange::new(DocPoint::new(0, 0), end))
    }

    /// Uniform-format summary of the current selection.
    pub fn current_format(&self) -> SelectionFormat {
        selection_format(&self.tree, &self.selection)
    }

    /// Type text at the caret, replacing the selection if one is active.
    pub fn insert_text(&mut self, text: &str) {
        let caret = self.collapse_selection();
        self.tree.insert_text(caret, text);
        let advance = text.chars().count();
        self.selection = DocRange::caret(DocPoint::new(caret.paragraph, caret.offset + advance));
    }

    /// Insert a paragraph break at the caret (the Enter key).
    pub fn insert_paragraph_break(&mut self) {
        let caret = self.collapse_selection();
        self.tree.split_paragraph(caret);
        self.selection = DocRange::caret(DocPoint::new(caret.paragraph + 1, 0));
    }

    /// Delete the selected text; a collapsed selection deletes nothing.
    pub fn delete_selection(&mut self) {
        self.collapse_selection();
    }

    /// Serialize the current tree for the element's `content` field.
    pub fn snapshot(&self) -> String {
        serialize_snapshot(&self.tree)
    }

    /// Delete any active selection and return the resulting caret point.
    fn collapse_selection(&mut self) -> DocPoint {
        let Some((start, end)) = self.selection.normalized(&self.tree) else {
            return DocPoint::new(0, 0);
        };
        if start != end {
            self.tree.delete_range(&self.selection);
        }
        self.selection = DocRange::caret(start);
        start
    }
}

impl FormatTarget for EditingSurface {
    fn apply_command(&mut self, command: &FormatCommand) -> SelectionFormat {
        self.tree = apply_format(&self.tree, &self.selection, &command.to_change());
        self.current_format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_from_plain_text() {
        let surface = EditingSurface::new("el-1", "Double click to edit");
        assert_eq!(surface.tree().plain_text(), "Double click to edit");
        assert!(surface.selection().is_collapsed());
        assert_eq!(surface.selection().anchor.offset, 20);
    }

    #[test]
    fn test_apply_command_formats_selection() {
        let mut surface = EditingSurface::new("el-1", "hello");
        surface.set_selection(DocRange::new(DocPoint::new(0, 0), DocPoint::new(0, 5)));

        let format = surface.apply_command(&FormatCommand::ToggleBold);
        assert!(format.bold);
        assert!(surface.tree().paragraphs[0].runs[0].marks.bold);

        let format = surface.apply_command(&FormatCommand::ToggleBold);
        assert!(!format.bold);
    }

    #[test]
    fn test_apply_command_at_caret_is_noop() {
        let mut surface = EditingSurface::new("el-1", "hello");
        let before = surface.tree().clone();
        surface.apply_command(&FormatCommand::ToggleItalic);
        assert_eq!(surface.tree(), &before);
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut surface = EditingSurface::new("el-1", "hello world");
        surface.set_selection(DocRange::new(DocPoint::new(0, 6), DocPoint::new(0, 11)));
        surface.insert_text("there");
        assert_eq!(surface.tree().plain_text(), "hello there");
        assert_eq!(surface.selection().anchor, DocPoint::new(0, 11));
    }

    #[test]
    fn test_paragraph_break_moves_caret() {
        let mut surface = EditingSurface::new("el-1", "hello world");
        surface.set_selection(DocRange::caret(DocPoint::new(0, 5)));
        surface.insert_paragraph_break();
        assert_eq!(surface.tree().paragraphs.len(), 2);
        assert_eq!(surface.selection().anchor, DocPoint::new(1, 0));
    }

    #[test]
    fn test_snapshot_round_trips_through_new_surface() {
        let mut surface = EditingSurface::new("el-1", "styled");
        surface.select_all();
        surface.apply_command(&FormatCommand::SetColor("#112233".into()));
        let snapshot = surface.snapshot();

        let reopened = EditingSurface::new("el-1", &snapshot);
        assert_eq!(reopened.tree(), surface.tree());
    }
}
