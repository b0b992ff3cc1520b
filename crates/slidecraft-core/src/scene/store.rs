//! The intent-dispatching scene store.

use super::interceptor::Interceptor;
use super::{Element, ElementUpdate, PresentationData, Slide};
use std::panic::{self, AssertUnwindSafe};

/// The canonical mutable editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    /// Persistence id, `None` until the presentation has been created or
    /// loaded through the synchronizer.
    pub id: Option<String>,
    pub title: String,
    /// Invariant: never empty.
    pub slides: Vec<Slide>,
    pub current_slide_id: String,
    pub selected_element_id: Option<String>,
}

impl Default for SceneState {
    fn default() -> Self {
        let first = Slide::first();
        Self {
            id: None,
            title: "Untitled Presentation".to_string(),
            current_slide_id: first.id.clone(),
            slides: vec![first],
            selected_element_id: None,
        }
    }
}

impl SceneState {
    /// The currently shown slide.
    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == self.current_slide_id)
    }

    /// The selected element on the current slide, if any.
    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selected_element_id.as_deref()?;
        self.current_slide()?.elements.iter().find(|e| e.id == id)
    }
}

/// A named, validated mutation request against the store.
///
/// Every intent either fully applies or is a no-op; an unknown slide or
/// element id never partially mutates the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Reset to a fresh single-slide presentation with the given title.
    CreatePresentation { title: String },
    /// Hydrate from a persistence fetch/create result.
    LoadPresentation(PresentationData),
    SetCurrentSlide(String),
    AddSlide,
    DeleteSlide(String),
    AddElement {
        slide_id: String,
        element: Element,
    },
    UpdateElement {
        slide_id: String,
        element_id: String,
        update: ElementUpdate,
    },
    SelectElement(Option<String>),
    /// Reserved intent shape; element deletion is not implemented and this
    /// is currently a no-op.
    DeleteElement {
        slide_id: String,
        element_id: String,
    },
}

impl Intent {
    /// Stable action name, used by the logging interceptors.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::CreatePresentation { .. } => "presentation/create",
            Intent::LoadPresentation(_) => "presentation/load",
            Intent::SetCurrentSlide(_) => "presentation/setCurrentSlide",
            Intent::AddSlide => "presentation/addSlide",
            Intent::DeleteSlide(_) => "presentation/deleteSlide",
            Intent::AddElement { .. } => "presentation/addElement",
            Intent::UpdateElement { .. } => "presentation/updateElement",
            Intent::SelectElement(_) => "presentation/selectElement",
            Intent::DeleteElement { .. } => "presentation/deleteElement",
        }
    }
}

/// The scene store: state plus an interceptor chain around dispatch.
///
/// Dispatch is synchronous and single-threaded; intents apply strictly in
/// dispatch order with no batching or coalescing.
#[derive(Default)]
pub struct SceneStore {
    state: SceneState,
    interceptors: Vec<Box<dyn Interceptor>>,
    /// Counts applied intents so persistence can watch for mutations.
    revision: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor to the dispatch chain. Interceptors run in
    /// registration order, `before` hooks then the reducer then `after`.
    pub fn add_interceptor(&mut self, interceptor: Box<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Read access to the current state.
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Monotonic counter incremented on every dispatched intent.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an intent.
    ///
    /// A panicking reducer is the one fatal case: it is logged together
    /// with the triggering intent, then propagated to the caller's crash
    /// boundary.
    pub fn dispatch(&mut self, intent: Intent) {
        for interceptor in &self.interceptors {
            interceptor.before(&intent, &self.state);
        }
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            Self::reduce(&mut self.state, &intent);
        }));
        if let Err(payload) = result {
            log::error!("reducer panicked while applying {:?}", intent);
            panic::resume_unwind(payload);
        }
        self.revision += 1;
        for interceptor in &self.interceptors {
            interceptor.after(&intent, &self.state);
        }
    }

    fn reduce(state: &mut SceneState, intent: &Intent) {
        match intent {
            Intent::CreatePresentation { title } => {
                *state = SceneState {
                    title: title.clone(),
                    ..SceneState::default()
                };
            }
            Intent::LoadPresentation(data) => {
                if data.slides.is_empty() {
                    // A presentation is never empty; refuse the hydration
                    // rather than break the invariant.
                    log::warn!("ignoring presentation {} with no slides", data.id);
                    return;
                }
                state.id = Some(data.id.clone());
                state.title = data.title.clone();
                state.slides = data.slides.clone();
                state.current_slide_id = data.slides[0].id.clone();
                state.selected_element_id = None;
            }
            Intent::SetCurrentSlide(slide_id) => {
                if !state.slides.iter().any(|s| &s.id == slide_id) {
                    return;
                }
                state.current_slide_id = slide_id.clone();
                state.selected_element_id = None;
            }
            Intent::AddSlide => {
                let slide = Slide::new();
                state.current_slide_id = slide.id.clone();
                state.slides.push(slide);
                state.selected_element_id = None;
            }
            Intent::DeleteSlide(slide_id) => {
                if state.slides.len() <= 1 {
                    return;
                }
                state.slides.retain(|s| &s.id != slide_id);
                if &state.current_slide_id == slide_id {
                    state.current_slide_id = state.slides[0].id.clone();
                    state.selected_element_id = None;
                }
            }
            Intent::AddElement { slide_id, element } => {
                let Some(slide) = state.slides.iter_mut().find(|s| &s.id == slide_id) else {
                    return;
                };
                state.selected_element_id = Some(element.id.clone());
                slide.elements.push(element.clone());
            }
            Intent::UpdateElement {
                slide_id,
                element_id,
                update,
            } => {
                let Some(slide) = state.slides.iter_mut().find(|s| &s.id == slide_id) else {
                    return;
                };
                let Some(element) = slide.elements.iter_mut().find(|e| &e.id == element_id)
                else {
                    return;
                };
                element.apply_update(update);
            }
            Intent::SelectElement(id) => {
                state.selected_element_id = id.clone();
            }
            Intent::DeleteElement { .. } => {
                // Reserved; see the intent docs.
            }
        }
    }

    /// Snapshot the state into the persistence wire shape.
    /// Returns `None` while no persistence id is assigned.
    pub fn to_presentation_data(&self) -> Option<PresentationData> {
        Some(PresentationData {
            id: self.state.id.clone()?,
            title: self.state.title.clone(),
            slides: self.state.slides.clone(),
        })
    }

    /// Convenience for adding a default text box to the current slide.
    pub fn add_text_box(&mut self) -> String {
        let element = Element::new_text_box();
        let id = element.id.clone();
        let slide_id = self.state.current_slide_id.clone();
        self.dispatch(Intent::AddElement { slide_id, element });
        id
    }
}
