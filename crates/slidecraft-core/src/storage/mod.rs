//! Persistence service abstraction and the debounced synchronizer.

mod memory;
mod sync;

pub use memory::MemoryService;
pub use sync::{PersistenceEvent, PersistenceOp, SAVE_DEBOUNCE, Synchronizer};

use crate::scene::{PresentationData, Slide};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("persistence service unavailable: {0}")]
    Unavailable(String),
    #[error("presentation not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for persistence operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Boxed future for async service calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote presentation service consumed by the editor.
///
/// Maps onto `POST /presentations`, `GET /presentations/{id}` and
/// `PUT /presentations/{id}`. All three may fail; the [`Synchronizer`]
/// wraps them with local fallbacks so the editor stays usable offline.
pub trait PresentationService: Send + Sync {
    /// Create a presentation, returning the server-assigned record.
    fn create(&self, title: &str) -> BoxFuture<'_, ServiceResult<PresentationData>>;

    /// Fetch a presentation by id.
    fn fetch(&self, id: &str) -> BoxFuture<'_, ServiceResult<PresentationData>>;

    /// Save (replace) a presentation's title and slides.
    fn save(&self, id: &str, title: &str, slides: &[Slide])
    -> BoxFuture<'_, ServiceResult<()>>;
}
