//! Direct-manipulation state for the canvas.
//!
//! Drag, resize, and text editing are one tagged state, so their mutual
//! exclusivity holds at the type level instead of relying on independent
//! boolean flags kept in sync by convention.

use crate::geometry::{ElementRect, ResizeHandle, compute_drag, compute_resize};
use crate::scene::{Element, ElementUpdate};
use kurbo::Point;

/// State of an active drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub element_id: String,
    /// Element position at gesture start.
    pub origin: Point,
    /// Pointer position at gesture start.
    pub start_pointer: Point,
}

/// State of an active resize gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub element_id: String,
    pub handle: ResizeHandle,
    /// Element rect at gesture start.
    pub origin: ElementRect,
    pub start_pointer: Point,
}

/// What the pointer is currently doing to the scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
    /// The element's text surface is focused; drag and resize are
    /// suppressed and the document model owns keystrokes.
    EditingText { element_id: String },
}

impl Interaction {
    /// Start dragging an element. Refused unless idle.
    pub fn begin_drag(&mut self, element: &Element, pointer: Point) -> bool {
        if !matches!(self, Interaction::Idle) {
            return false;
        }
        *self = Interaction::Dragging(DragState {
            element_id: element.id.clone(),
            origin: Point::new(element.x, element.y),
            start_pointer: pointer,
        });
        true
    }

    /// Start resizing an element by a corner handle. Refused unless idle.
    pub fn begin_resize(&mut self, element: &Element, handle: ResizeHandle, pointer: Point) -> bool {
        if !matches!(self, Interaction::Idle) {
            return false;
        }
        *self = Interaction::Resizing(ResizeState {
            element_id: element.id.clone(),
            handle,
            origin: element.rect(),
            start_pointer: pointer,
        });
        true
    }

    /// Enter text-editing mode for an element (double click). Refused
    /// while a gesture is in progress.
    pub fn begin_editing(&mut self, element_id: impl Into<String>) -> bool {
        if matches!(self, Interaction::Dragging(_) | Interaction::Resizing(_)) {
            return false;
        }
        *self = Interaction::EditingText {
            element_id: element_id.into(),
        };
        true
    }

    /// Compute the element update for a pointer move.
    ///
    /// The update is always derived from the gesture-start absolutes plus
    /// the total delta, never from the previous move. Returns the target
    /// element id with the update, or `None` when no gesture is active.
    pub fn pointer_moved(&self, pointer: Point) -> Option<(String, ElementUpdate)> {
        match self {
            Interaction::Dragging(drag) => {
                let delta = pointer - drag.start_pointer;
                let pos = compute_drag(drag.origin, delta);
                Some((drag.element_id.clone(), ElementUpdate::position(pos.x, pos.y)))
            }
            Interaction::Resizing(resize) => {
                let delta = pointer - resize.start_pointer;
                let rect = compute_resize(resize.handle, resize.origin, delta);
                Some((resize.element_id.clone(), ElementUpdate::from_rect(rect)))
            }
            Interaction::Idle | Interaction::EditingText { .. } => None,
        }
    }

    /// End the active drag/resize gesture (pointer up).
    pub fn finish_gesture(&mut self) {
        if matches!(self, Interaction::Dragging(_) | Interaction::Resizing(_)) {
            *self = Interaction::Idle;
        }
    }

    /// Leave text-editing mode.
    pub fn finish_editing(&mut self) {
        if matches!(self, Interaction::EditingText { .. }) {
            *self = Interaction::Idle;
        }
    }

    /// Whether the given element is in edit mode.
    pub fn is_editing(&self, element_id: &str) -> bool {
        matches!(self, Interaction::EditingText { element_id: id } if id == element_id)
    }
}
