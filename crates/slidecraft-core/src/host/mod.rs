//! Encapsulated editor host.
//!
//! The host is an isolation boundary around the rich-text editor: it is
//! mounted once with its own stylesheet, owns the editing surface while an
//! element is in edit mode, and hands back nothing but a serialized
//! snapshot when editing ends. Outer styling and outer state never reach
//! the surface except through the [`FormatBus`].

mod surface;

pub use surface::EditingSurface;

use crate::bus::{FormatBus, SelectionFormatEvent};
use crate::document::DocRange;
use crate::scene::Element;
use std::sync::{Arc, Mutex};

/// Host container for one element's editor instance.
///
/// Lifecycle: [`mount`](IsolatedHost::mount) once, then any number of
/// [`begin_editing`](IsolatedHost::begin_editing) /
/// [`end_editing`](IsolatedHost::end_editing) cycles.
#[derive(Default)]
pub struct IsolatedHost {
    stylesheet: Option<String>,
    surface: Option<Arc<Mutex<EditingSurface>>>,
}

impl IsolatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the host's stylesheet. The first call wins; repeat mounts
    /// are no-ops so remounting a view cannot duplicate styles or reset an
    /// editing session. Returns whether this call performed the mount.
    ///
    /// The stylesheet is installed here, before any content exists, so the
    /// editor never renders unstyled.
    pub fn mount(&mut self, stylesheet: impl Into<String>) -> bool {
        if self.stylesheet.is_some() {
            log::debug!("host already mounted, ignoring remount");
            return false;
        }
        self.stylesheet = Some(stylesheet.into());
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.stylesheet.is_some()
    }

    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet.as_deref()
    }

    /// The element currently being edited, if any.
    pub fn editing_element_id(&self) -> Option<String> {
        let surface = self.surface.as_ref()?;
        match surface.lock() {
            Ok(surface) => Some(surface.element_id().to_string()),
            Err(poisoned) => Some(poisoned.into_inner().element_id().to_string()),
        }
    }

    /// Open an editing session for `element` and attach its surface to the
    /// bus. Requires a prior mount; an unmounted host refuses and returns
    /// `None`. A session already in progress is ended first; its snapshot
    /// is dropped, so callers that care about the pending edits should
    /// call [`end_editing`](IsolatedHost::end_editing) themselves.
    pub fn begin_editing(
        &mut self,
        element: &Element,
        bus: &FormatBus,
    ) -> Option<Arc<Mutex<EditingSurface>>> {
        if !self.is_mounted() {
            log::warn!("begin_editing on unmounted host refused");
            return None;
        }
        if let Some(previous) = self.editing_element_id() {
            log::warn!("implicitly ending edit session for {previous}");
            self.end_editing(bus);
        }

        let surface = Arc::new(Mutex::new(EditingSurface::new(&element.id, &element.content)));
        let target: Arc<Mutex<dyn crate::bus::FormatTarget>> = surface.clone();
        bus.attach(&element.id, Arc::downgrade(&target));
        self.surface = Some(surface.clone());

        // Announce the starting selection so toolbars sync immediately.
        let format = match surface.lock() {
            Ok(s) => s.current_format(),
            Err(poisoned) => poisoned.into_inner().current_format(),
        };
        bus.broadcast(&SelectionFormatEvent {
            element_id: element.id.clone(),
            format,
        });
        Some(surface)
    }

    /// Close the editing session: detach from the bus and return the final
    /// snapshot for the element's `content` field. `None` when no session
    /// was active.
    pub fn end_editing(&mut self, bus: &FormatBus) -> Option<String> {
        let surface = self.surface.take()?;
        let (element_id, snapshot) = match surface.lock() {
            Ok(surface) => (surface.element_id().to_string(), surface.snapshot()),
            Err(poisoned) => {
                let surface = poisoned.into_inner();
                (surface.element_id().to_string(), surface.snapshot())
            }
        };
        bus.detach(&element_id);
        Some(snapshot)
    }

    /// Report a selection change on the active surface and broadcast the
    /// resulting format summary.
    pub fn selection_changed(&self, range: DocRange, bus: &FormatBus) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let (element_id, format) = match surface.lock() {
            Ok(mut surface) => (
                surface.element_id().to_string(),
                surface.set_selection(range),
            ),
            Err(poisoned) => {
                let mut surface = poisoned.into_inner();
                (
                    surface.element_id().to_string(),
                    surface.set_selection(range),
                )
            }
        };
        bus.broadcast(&SelectionFormatEvent { element_id, format });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{FormatCommand, FormatTarget};
    use crate::document::{DocPoint, DocumentTree, parse_snapshot};

    const STYLESHEET: &str = ".editor { font-family: Arial; }";

    fn text_box() -> Element {
        Element::new_text_box()
    }

    #[test]
    fn test_mount_is_idempotent() {
        let mut host = IsolatedHost::new();
        assert!(host.mount(STYLESHEET));
        assert!(!host.mount("body { color: red; }"));
        // The first stylesheet stays in place.
        assert_eq!(host.stylesheet(), Some(STYLESHEET));
    }

    #[test]
    fn test_begin_editing_requires_mount() {
        let mut host = IsolatedHost::new();
        let bus = FormatBus::new();
        assert!(host.begin_editing(&text_box(), &bus).is_none());
        assert!(host.editing_element_id().is_none());
    }

    #[test]
    fn test_command_reaches_surface_through_bus() {
        let mut host = IsolatedHost::new();
        host.mount(STYLESHEET);
        let bus = FormatBus::new();
        let element = text_box();
        let surface = host.begin_editing(&element, &bus).unwrap();

        {
            let mut surface = surface.lock().unwrap();
            surface.select_all();
        }
        bus.send(&element.id, FormatCommand::ToggleBold);

        let surface = surface.lock().unwrap();
        assert!(surface.tree().paragraphs[0].runs[0].marks.bold);
    }

    #[test]
    fn test_end_editing_detaches_and_snapshots() {
        let mut host = IsolatedHost::new();
        host.mount(STYLESHEET);
        let bus = FormatBus::new();
        let element = text_box();
        let surface = host.begin_editing(&element, &bus).unwrap();

        {
            let mut surface = surface.lock().unwrap();
            surface.select_all();
            surface.insert_text("final words");
        }
        let snapshot = host.end_editing(&bus).unwrap();
        let tree = parse_snapshot(&snapshot).unwrap();
        assert_eq!(tree.plain_text(), "final words");

        // The bus no longer has a target for the element.
        bus.send(&element.id, FormatCommand::ToggleBold);
        let reparsed = parse_snapshot(&snapshot).unwrap();
        assert_eq!(reparsed, tree);
        assert!(host.end_editing(&bus).is_none());
    }

    #[test]
    fn test_begin_editing_ends_previous_session() {
        let mut host = IsolatedHost::new();
        host.mount(STYLESHEET);
        let bus = FormatBus::new();
        let first = text_box();
        let second = text_box();

        host.begin_editing(&first, &bus);
        host.begin_editing(&second, &bus);
        assert_eq!(host.editing_element_id(), Some(second.id.clone()));

        // Commands for the first element are dropped now.
        bus.send(&first.id, FormatCommand::ToggleBold);
        let snapshot = host.end_editing(&bus).unwrap();
        let tree = parse_snapshot(&snapshot).unwrap();
        assert_eq!(tree, DocumentTree::from_plain_text("Double click to edit"));
    }

    #[test]
    fn test_begin_editing_broadcasts_initial_format() {
        let mut host = IsolatedHost::new();
        host.mount(STYLESHEET);
        let bus = FormatBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |event: &SelectionFormatEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        let element = text_box();
        host.begin_editing(&element, &bus);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].element_id, element.id);
    }

    #[test]
    fn test_selection_changed_broadcasts_format() {
        let mut host = IsolatedHost::new();
        host.mount(STYLESHEET);
        let bus = FormatBus::new();
        let element = text_box();
        let surface = host.begin_editing(&element, &bus).unwrap();
        {
            let mut surface = surface.lock().unwrap();
            surface.select_all();
            surface.apply_command(&FormatCommand::ToggleBold);
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |event: &SelectionFormatEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        host.selection_changed(
            DocRange::new(DocPoint::new(0, 0), DocPoint::new(0, 5)),
            &bus,
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].format.bold);
    }
}
