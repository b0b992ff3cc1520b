//! Debounced persistence synchronizer with offline fallback.
//!
//! Every scene mutation restarts a trailing-edge debounce window; when the
//! window elapses, one save is issued carrying whatever the state is at
//! that moment, so bursts of edits coalesce into a single call. Failed
//! service calls degrade to synthesized local results instead of erroring:
//! the editor keeps working offline, and each degradation is reported on a
//! drainable event queue so a caller can surface it.

use super::PresentationService;
use crate::scene::{PresentationData, Slide, unique_id};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trailing-edge debounce window for saves.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Which service call an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Create,
    Fetch,
    Save,
}

/// Outcome notifications surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceEvent {
    /// The service call succeeded.
    Completed { op: PersistenceOp, id: String },
    /// The service call failed and a local fallback was synthesized. The
    /// editor keeps working, but a degraded save is not durable.
    Degraded {
        op: PersistenceOp,
        id: String,
        reason: String,
    },
}

/// Debounced bridge between the scene store and a [`PresentationService`].
pub struct Synchronizer<S: PresentationService> {
    service: Arc<S>,
    debounce: Duration,
    /// Start of the current debounce window; `None` when nothing is
    /// pending.
    pending_since: Option<Instant>,
    /// Store revision seen by the last `observe_revision` call.
    last_revision: u64,
    events: Vec<PersistenceEvent>,
}

impl<S: PresentationService> Synchronizer<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            debounce: SAVE_DEBOUNCE,
            pending_since: None,
            last_revision: 0,
            events: Vec::new(),
        }
    }

    /// Override the debounce window (tests use zero).
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a scene mutation: restarts the debounce window, cancelling
    /// the previously scheduled save.
    pub fn note_mutation(&mut self) {
        self.pending_since = Some(Instant::now());
    }

    /// Watch the store's revision counter; a changed revision counts as a
    /// mutation. Call with [`SceneStore::revision`] after dispatching.
    ///
    /// [`SceneStore::revision`]: crate::scene::SceneStore::revision
    pub fn observe_revision(&mut self, revision: u64) {
        if revision != self.last_revision {
            self.last_revision = revision;
            self.note_mutation();
        }
    }

    /// Whether a save is pending and its window has elapsed.
    pub fn save_due(&self) -> bool {
        match self.pending_since {
            Some(since) => since.elapsed() >= self.debounce,
            None => false,
        }
    }

    /// Drain accumulated persistence events.
    pub fn poll_events(&mut self) -> Vec<PersistenceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Create a presentation, falling back to a fresh local single-slide
    /// presentation when the service is unreachable. Never fails.
    pub async fn create(&mut self, title: &str) -> PresentationData {
        match self.service.create(title).await {
            Ok(data) => {
                self.push_completed(PersistenceOp::Create, &data.id);
                data
            }
            Err(err) => {
                log::warn!("create failed ({err}), using local presentation");
                let data = PresentationData {
                    id: unique_id("local"),
                    title: title.to_string(),
                    slides: vec![Slide::first()],
                };
                self.push_degraded(PersistenceOp::Create, &data.id, &err.to_string());
                data
            }
        }
    }

    /// Fetch a presentation, falling back to an untitled single-slide
    /// presentation under the requested id. Never fails.
    pub async fn fetch(&mut self, id: &str) -> PresentationData {
        match self.service.fetch(id).await {
            Ok(data) => {
                self.push_completed(PersistenceOp::Fetch, id);
                data
            }
            Err(err) => {
                log::warn!("fetch of {id} failed ({err}), using local presentation");
                self.push_degraded(PersistenceOp::Fetch, id, &err.to_string());
                PresentationData {
                    id: id.to_string(),
                    title: "Untitled Presentation".to_string(),
                    slides: vec![Slide::first()],
                }
            }
        }
    }

    /// Issue the pending save if its debounce window has elapsed.
    ///
    /// `data` should be read from the store at call time so the payload
    /// reflects the latest mutation. Returns true when a save was issued.
    pub async fn flush_if_due(&mut self, data: &PresentationData) -> bool {
        if !self.save_due() {
            return false;
        }
        self.save_now(data).await;
        true
    }

    /// Save immediately, acknowledging optimistically on failure.
    ///
    /// There is no cancellation of in-flight saves; a slow save may
    /// resolve after a newer one was dispatched (last-resolved-wins).
    pub async fn save_now(&mut self, data: &PresentationData) {
        self.pending_since = None;
        match self
            .service
            .save(&data.id, &data.title, &data.slides)
            .await
        {
            Ok(()) => self.push_completed(PersistenceOp::Save, &data.id),
            Err(err) => {
                log::warn!("save of {} failed ({err}), keeping local state", data.id);
                self.push_degraded(PersistenceOp::Save, &data.id, &err.to_string());
            }
        }
    }

    fn push_completed(&mut self, op: PersistenceOp, id: &str) {
        self.events.push(PersistenceEvent::Completed {
            op,
            id: id.to_string(),
        });
    }

    fn push_degraded(&mut self, op: PersistenceOp, id: &str, reason: &str) {
        self.events.push(PersistenceEvent::Degraded {
            op,
            id: id.to_string(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Intent, SceneStore};
    use crate::storage::MemoryService;
    use crate::storage::test_util::block_on;

    fn synchronizer() -> (Arc<MemoryService>, Synchronizer<MemoryService>) {
        let service = Arc::new(MemoryService::new());
        let sync = Synchronizer::new(service.clone());
        (service, sync)
    }

    #[test]
    fn test_burst_of_mutations_coalesces_into_one_save() {
        let (service, mut sync) = synchronizer();
        let created = block_on(sync.create("Deck"));
        sync.set_debounce(Duration::ZERO);

        // Three mutations inside one debounce window.
        sync.note_mutation();
        sync.note_mutation();
        sync.note_mutation();

        let latest = PresentationData {
            slides: vec![Slide::first(), Slide::new()],
            ..created
        };
        assert!(block_on(sync.flush_if_due(&latest)));
        // Nothing left pending; a second flush is a no-op.
        assert!(!block_on(sync.flush_if_due(&latest)));

        assert_eq!(service.save_count(), 1);
        // The payload reflects the state at flush time.
        assert_eq!(service.get(&latest.id).unwrap().slides.len(), 2);
    }

    #[test]
    fn test_observe_revision_schedules_save_on_change() {
        let (_, mut sync) = synchronizer();
        let mut store = SceneStore::new();
        sync.set_debounce(Duration::ZERO);

        // Nothing dispatched yet; the initial revision is not a mutation.
        sync.observe_revision(store.revision());
        assert!(!sync.save_due());

        store.dispatch(Intent::AddSlide);
        sync.observe_revision(store.revision());
        assert!(sync.save_due());
    }

    #[test]
    fn test_save_not_due_before_window_elapses() {
        let (_, mut sync) = synchronizer();
        sync.note_mutation();
        // Default window is 2s; nothing should be due immediately.
        assert!(!sync.save_due());
    }

    #[test]
    fn test_mutation_restarts_the_window() {
        let (_, mut sync) = synchronizer();
        sync.set_debounce(Duration::from_secs(60));
        sync.note_mutation();
        assert!(!sync.save_due());
        sync.set_debounce(Duration::ZERO);
        assert!(sync.save_due());
        // A fresh mutation under a long window cancels the due save.
        sync.set_debounce(Duration::from_secs(60));
        sync.note_mutation();
        assert!(!sync.save_due());
    }

    #[test]
    fn test_create_falls_back_when_offline() {
        let (service, mut sync) = synchronizer();
        service.set_offline(true);

        let data = block_on(sync.create("Deck"));
        assert!(data.id.starts_with("local-"));
        assert_eq!(data.title, "Deck");
        assert_eq!(data.slides.len(), 1);
        assert!(matches!(
            sync.poll_events().as_slice(),
            [PersistenceEvent::Degraded {
                op: PersistenceOp::Create,
                ..
            }]
        ));
    }

    #[test]
    fn test_fetch_falls_back_when_offline() {
        let (service, mut sync) = synchronizer();
        service.set_offline(true);

        let data = block_on(sync.fetch("pres-42"));
        assert_eq!(data.id, "pres-42");
        assert_eq!(data.title, "Untitled Presentation");
        assert_eq!(data.slides[0].id, "slide-1");
    }

    #[test]
    fn test_save_failure_acknowledges_optimistically() {
        let (service, mut sync) = synchronizer();
        let created = block_on(sync.create("Deck"));
        service.set_offline(true);

        sync.set_debounce(Duration::ZERO);
        sync.note_mutation();
        assert!(block_on(sync.flush_if_due(&created)));

        // Pending state is cleared despite the failure.
        assert!(!sync.save_due());
        let events = sync.poll_events();
        assert!(events.iter().any(|e| matches!(
            e,
            PersistenceEvent::Degraded {
                op: PersistenceOp::Save,
                ..
            }
        )));
    }

    #[test]
    fn test_events_drain_once() {
        let (_, mut sync) = synchronizer();
        block_on(sync.create("Deck"));
        assert_eq!(sync.poll_events().len(), 1);
        assert!(sync.poll_events().is_empty());
    }
}
