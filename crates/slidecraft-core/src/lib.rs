//! SlideCraft Core Library
//!
//! Platform-agnostic editing core for the SlideCraft presentation editor:
//! the rich-text document model, the formatting command bus, slide and
//! element state, interaction gestures, and debounced persistence.

pub mod bus;
pub mod document;
pub mod geometry;
pub mod host;
pub mod interaction;
pub mod scene;
pub mod storage;

pub use bus::{FormatBus, FormatCommand, FormatTarget, SelectionFormatEvent};
pub use document::{DocPoint, DocRange, DocumentTree, SelectionFormat};
pub use geometry::{ElementRect, MIN_ELEMENT_SIZE, ResizeHandle, compute_drag, compute_resize};
pub use host::{EditingSurface, IsolatedHost};
pub use interaction::Interaction;
pub use scene::{Element, ElementUpdate, Intent, PresentationData, SceneState, SceneStore, Slide};
pub use storage::{PersistenceEvent, PresentationService, Synchronizer};
