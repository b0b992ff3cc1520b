//! In-memory persistence service for tests and ephemeral use.

use super::{BoxFuture, PresentationService, ServiceError, ServiceResult};
use crate::scene::{PresentationData, Slide, unique_id};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory backend with an offline switch for exercising the
/// synchronizer's fallback path.
#[derive(Default)]
pub struct MemoryService {
    presentations: RwLock<HashMap<String, PresentationData>>,
    offline: AtomicBool,
    save_calls: AtomicUsize,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, as if the network dropped.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `save` calls that reached the service (including failed
    /// ones).
    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Read back a stored presentation.
    pub fn get(&self, id: &str) -> Option<PresentationData> {
        self.presentations
            .read()
            .ok()
            .and_then(|map| map.get(id).cloned())
    }

    fn check_online(&self) -> ServiceResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ServiceError::Unavailable("offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl PresentationService for MemoryService {
    fn create(&self, title: &str) -> BoxFuture<'_, ServiceResult<PresentationData>> {
        let title = title.to_string();
        Box::pin(async move {
            self.check_online()?;
            let data = PresentationData {
                id: unique_id("pres"),
                title,
                slides: vec![Slide::first()],
            };
            let mut map = self
                .presentations
                .write()
                .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
            map.insert(data.id.clone(), data.clone());
            Ok(data)
        })
    }

    fn fetch(&self, id: &str) -> BoxFuture<'_, ServiceResult<PresentationData>> {
        let id = id.to_string();
        Box::pin(async move {
            self.check_online()?;
            let map = self
                .presentations
                .read()
                .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
            map.get(&id)
                .cloned()
                .ok_or(ServiceError::NotFound(id))
        })
    }

    fn save(
        &self,
        id: &str,
        title: &str,
        slides: &[Slide],
    ) -> BoxFuture<'_, ServiceResult<()>> {
        let id = id.to_string();
        let title = title.to_string();
        let slides = slides.to_vec();
        Box::pin(async move {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            self.check_online()?;
            let mut map = self
                .presentations
                .write()
                .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
            map.insert(
                id.clone(),
                PresentationData { id, title, slides },
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_util::block_on;

    #[test]
    fn test_create_then_fetch() {
        let service = MemoryService::new();
        let created = block_on(service.create("Deck")).unwrap();
        let fetched = block_on(service.fetch(&created.id)).unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.slides.len(), 1);
    }

    #[test]
    fn test_fetch_unknown_is_not_found() {
        let service = MemoryService::new();
        assert!(matches!(
            block_on(service.fetch("nope")),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let service = MemoryService::new();
        let created = block_on(service.create("Deck")).unwrap();
        let slides = vec![Slide::new(), Slide::new()];
        block_on(service.save(&created.id, "Renamed", &slides)).unwrap();

        let fetched = block_on(service.fetch(&created.id)).unwrap();
        assert_eq!(fetched.title, "Renamed");
        assert_eq!(fetched.slides, slides);
        assert_eq!(service.save_count(), 1);
    }

    #[test]
    fn test_offline_fails_every_call() {
        let service = MemoryService::new();
        service.set_offline(true);
        assert!(block_on(service.create("Deck")).is_err());
        assert!(block_on(service.fetch("x")).is_err());
        assert!(block_on(service.save("x", "t", &[])).is_err());
    }
}
