//! Dispatch interceptors: pre/post hooks around the store's reducer.
//!
//! The chain replaces ad-hoc global logging side effects: observers are
//! registered explicitly on the store and see every intent in dispatch
//! order.

use super::store::{Intent, SceneState};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A hook pair invoked around every dispatched intent.
pub trait Interceptor: Send + Sync {
    /// Called before the reducer runs.
    fn before(&self, _intent: &Intent, _state: &SceneState) {}

    /// Called after the reducer has applied the intent.
    fn after(&self, _intent: &Intent, _state: &SceneState) {}
}

/// Logs every intent with a small digest of the resulting state.
#[derive(Debug, Default)]
pub struct ActionLogger;

impl Interceptor for ActionLogger {
    fn before(&self, intent: &Intent, _state: &SceneState) {
        log::debug!("dispatch {}", intent.name());
    }

    fn after(&self, intent: &Intent, state: &SceneState) {
        log::debug!(
            "applied {}: {} slide(s), current={}, selected={:?}",
            intent.name(),
            state.slides.len(),
            state.current_slide_id,
            state.selected_element_id,
        );
    }
}

/// Warns when a dispatch exceeds a frame budget.
#[derive(Debug)]
pub struct TimingLogger {
    threshold: Duration,
    started: Mutex<Option<Instant>>,
}

impl TimingLogger {
    /// One 60fps frame.
    pub const FRAME_BUDGET: Duration = Duration::from_millis(16);

    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            started: Mutex::new(None),
        }
    }
}

impl Default for TimingLogger {
    fn default() -> Self {
        Self::new(Self::FRAME_BUDGET)
    }
}

impl Interceptor for TimingLogger {
    fn before(&self, _intent: &Intent, _state: &SceneState) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn after(&self, intent: &Intent, _state: &SceneState) {
        let Ok(started) = self.started.lock() else {
            return;
        };
        if let Some(start) = *started {
            let elapsed = start.elapsed();
            if elapsed > self.threshold {
                log::warn!("slow intent {} took {:?}", intent.name(), elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneStore;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        before: Arc<AtomicUsize>,
        after: Arc<AtomicUsize>,
    }

    impl Interceptor for Counting {
        fn before(&self, _intent: &Intent, _state: &SceneState) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }

        fn after(&self, _intent: &Intent, state: &SceneState) {
            // After hooks observe the already-mutated state.
            assert!(!state.slides.is_empty());
            self.after.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_hooks_run_around_every_dispatch() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let mut store = SceneStore::new();
        store.add_interceptor(Box::new(Counting {
            before: before.clone(),
            after: after.clone(),
        }));
        store.add_interceptor(Box::new(ActionLogger));
        store.add_interceptor(Box::new(TimingLogger::default()));

        store.dispatch(Intent::AddSlide);
        store.dispatch(Intent::SelectElement(None));

        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 2);
    }
}
