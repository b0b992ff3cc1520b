//! Pure geometry for element drag and resize.
//!
//! Both operations take the absolute values captured at gesture start plus
//! the total pointer delta, and are recomputed from scratch on every pointer
//! move. Nothing here accumulates incremental deltas, so rounding error
//! cannot compound across a long gesture.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum element width/height in logical units.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Corner handle used to resize an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    /// North-west (top-left) corner.
    Nw,
    /// North-east (top-right) corner.
    Ne,
    /// South-west (bottom-left) corner.
    Sw,
    /// South-east (bottom-right) corner.
    Se,
}

impl ResizeHandle {
    /// All four corner handles, in the order they are rendered.
    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::Nw,
            ResizeHandle::Ne,
            ResizeHandle::Sw,
            ResizeHandle::Se,
        ]
    }

    fn is_north(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::Ne)
    }

    fn is_west(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::Sw)
    }
}

/// Position and size of an element on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner as a point.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Compute the new position of a dragged element.
///
/// `initial` is the element position at drag start, `delta` the total
/// pointer movement since then. The result is not clamped to the canvas;
/// elements can be dragged out of view.
pub fn compute_drag(initial: Point, delta: Vec2) -> Point {
    initial + delta
}

/// Compute the new rect of an element resized by a corner handle.
///
/// East handles grow width with `dx`, west handles shrink width and shift
/// `x` by `dx`; south handles grow height with `dy`, north handles shrink
/// height and shift `y` by `dy`. Width and height are clamped to
/// [`MIN_ELEMENT_SIZE`] after the corner math; the x/y offsets come from the
/// unclamped dimensions, so a clamped west/north resize keeps following the
/// pointer.
pub fn compute_resize(handle: ResizeHandle, initial: ElementRect, delta: Vec2) -> ElementRect {
    let (x, width) = if handle.is_west() {
        (initial.x + delta.x, initial.width - delta.x)
    } else {
        (initial.x, initial.width + delta.x)
    };
    let (y, height) = if handle.is_north() {
        (initial.y + delta.y, initial.height - delta.y)
    } else {
        (initial.y, initial.height + delta.y)
    };

    ElementRect {
        x,
        y,
        width: width.max(MIN_ELEMENT_SIZE),
        height: height.max(MIN_ELEMENT_SIZE),
    }
}
