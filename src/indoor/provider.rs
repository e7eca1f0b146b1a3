//! On-demand indoor details, cached by place id.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use hashbrown::HashMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::IndoorError;
use crate::models::{Boundary, IndoorDetails};

/// Immutable view of every place whose details have been fetched
pub type IndoorSnapshot = HashMap<String, Arc<IndoorDetails>>;

/// The indoor-positioning collaborator
#[async_trait]
pub trait IndoorProvider: Send + Sync {
    async fn fetch(&self, place_id: &str) -> Result<IndoorDetails, IndoorError>;
}

/// Provider over a fixed set of details (bundled JSON, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticIndoorProvider {
    details: HashMap<String, IndoorDetails>,
}

impl StaticIndoorProvider {
    pub fn new(details: impl IntoIterator<Item = IndoorDetails>) -> Self {
        Self {
            details: details
                .into_iter()
                .map(|d| (d.place_id.clone(), d))
                .collect(),
        }
    }

    /// Read a JSON array of [`IndoorDetails`]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, IndoorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| IndoorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let details: Vec<IndoorDetails> =
            serde_json::from_str(&content).map_err(|source| IndoorError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Loaded indoor details for {} places from {}",
            details.len(),
            path.display()
        );
        Ok(Self::new(details))
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

#[async_trait]
impl IndoorProvider for StaticIndoorProvider {
    async fn fetch(&self, place_id: &str) -> Result<IndoorDetails, IndoorError> {
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| IndoorError::UnknownPlace(place_id.to_string()))
    }
}

/// Cache of fetched indoor details.
///
/// Entries are written once and never changed. Each population publishes a
/// new snapshot, so a matcher holding an older snapshot keeps a consistent
/// view.
pub struct IndoorFrameCache {
    provider: Arc<dyn IndoorProvider>,
    current: ArcSwap<IndoorSnapshot>,
}

impl IndoorFrameCache {
    pub fn new(provider: Arc<dyn IndoorProvider>) -> Self {
        Self {
            provider,
            current: ArcSwap::from_pointee(IndoorSnapshot::new()),
        }
    }

    pub fn snapshot(&self) -> Arc<IndoorSnapshot> {
        self.current.load_full()
    }

    pub fn get(&self, place_id: &str) -> Option<Arc<IndoorDetails>> {
        self.snapshot().get(place_id).cloned()
    }

    /// Details for a place, asking the provider only on a cache miss.
    ///
    /// Failures are returned to the caller and leave the cache untouched.
    pub async fn fetch(&self, place_id: &str) -> Result<Arc<IndoorDetails>, IndoorError> {
        if let Some(details) = self.get(place_id) {
            debug!("Indoor details for {} already loaded", place_id);
            return Ok(details);
        }

        let details = self.provider.fetch(place_id).await.map_err(|e| {
            warn!("Failed to load indoor details for {}: {}", place_id, e);
            e
        })?;
        debug!(
            "Indoor details loaded for {}: {} zones, {} points of interest",
            place_id,
            details.zones.len(),
            details.points_of_interest.len()
        );
        Ok(self.populate(place_id, details))
    }

    /// Like [`fetch`](Self::fetch), but gives up with `Ok(None)` once
    /// `shutdown` reads `true` (including before the call) or its sender is
    /// dropped.
    pub async fn fetch_cancellable(
        &self,
        place_id: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Option<Arc<IndoorDetails>>, IndoorError> {
        if *shutdown.borrow_and_update() {
            debug!("Indoor fetch for {} skipped, already shutting down", place_id);
            return Ok(None);
        }

        tokio::select! {
            result = self.fetch(place_id) => result.map(Some),
            _ = shutdown.wait_for(|stop| *stop) => {
                debug!("Indoor fetch for {} cancelled", place_id);
                Ok(None)
            }
        }
    }

    /// Fetch details for every connected boundary. Returns how many places
    /// are cached afterwards; failures are logged and skipped.
    pub async fn prefetch_connected(&self, boundaries: &[Boundary]) -> usize {
        for boundary in boundaries.iter().filter(|b| b.connected) {
            if let Err(e) = self.fetch(&boundary.id).await {
                debug!("No indoor details for {}: {}", boundary.name, e);
            }
        }
        self.snapshot().len()
    }

    /// Insert details under `place_id` unless already present, returning the
    /// cached entry.
    pub fn populate(&self, place_id: &str, details: IndoorDetails) -> Arc<IndoorDetails> {
        let details = Arc::new(details);
        self.current.rcu(|current| {
            if current.contains_key(place_id) {
                return Arc::clone(current);
            }
            let mut next = IndoorSnapshot::clone(current);
            next.insert(place_id.to_string(), Arc::clone(&details));
            Arc::new(next)
        });
        self.get(place_id).unwrap_or(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingFrame, GeoPoint};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn details(place_id: &str) -> IndoorDetails {
        IndoorDetails {
            place_id: place_id.to_string(),
            frame: BuildingFrame {
                origin: GeoPoint::new(28.0, 77.0),
                width_meters: 20.0,
                height_meters: 10.0,
                azimuth_degrees: 0.0,
            },
            zones: vec![],
            points_of_interest: vec![],
        }
    }

    struct CountingProvider {
        inner: StaticIndoorProvider,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IndoorProvider for CountingProvider {
        async fn fetch(&self, place_id: &str) -> Result<IndoorDetails, IndoorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(place_id).await
        }
    }

    struct PendingProvider;

    #[async_trait]
    impl IndoorProvider for PendingProvider {
        async fn fetch(&self, _place_id: &str) -> Result<IndoorDetails, IndoorError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_fetch_once() {
        let provider = Arc::new(CountingProvider {
            inner: StaticIndoorProvider::new([details("1042")]),
            calls: AtomicUsize::new(0),
        });
        let cache = IndoorFrameCache::new(provider.clone());

        let first = cache.fetch("1042").await.unwrap();
        let second = cache.fetch("1042").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_unchanged() {
        let cache = IndoorFrameCache::new(Arc::new(StaticIndoorProvider::default()));
        let before = cache.snapshot();
        assert!(matches!(
            cache.fetch("missing").await,
            Err(IndoorError::UnknownPlace(_))
        ));
        assert!(cache.snapshot().is_empty());
        assert!(Arc::ptr_eq(&before, &cache.snapshot()));
    }

    #[tokio::test]
    async fn test_snapshots_are_not_mutated() {
        let cache = IndoorFrameCache::new(Arc::new(StaticIndoorProvider::new([
            details("a"),
            details("b"),
        ])));
        cache.fetch("a").await.unwrap();
        let old = cache.snapshot();
        cache.fetch("b").await.unwrap();

        assert_eq!(old.len(), 1);
        assert_eq!(cache.snapshot().len(), 2);
    }

    #[test]
    fn test_populate_keeps_first_entry() {
        let cache = IndoorFrameCache::new(Arc::new(StaticIndoorProvider::default()));
        let first = cache.populate("x", details("x"));
        let mut replacement = details("x");
        replacement.frame.width_meters = 99.0;
        let second = cache.populate("x", replacement);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get("x").unwrap().frame.width_meters, 20.0);
    }

    #[tokio::test]
    async fn test_fetch_cancellable() {
        let cache = IndoorFrameCache::new(Arc::new(PendingProvider));
        let (tx, rx) = watch::channel(false);

        let cancel = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let _ = tx.send(true);
        });

        let result = cache.fetch_cancellable("slow", rx).await.unwrap();
        assert!(result.is_none());
        assert!(cache.snapshot().is_empty());
        cancel.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_cancellable_already_signalled() {
        let cache = IndoorFrameCache::new(Arc::new(PendingProvider));
        let (_tx, rx) = watch::channel(true);

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            cache.fetch_cancellable("slow", rx),
        )
        .await
        .expect("fetch should not wait for a signalled shutdown");
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_cancellable_seen_signal() {
        let cache = IndoorFrameCache::new(Arc::new(PendingProvider));
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        // The receiver has already observed the change
        rx.changed().await.unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            cache.fetch_cancellable("slow", rx),
        )
        .await
        .expect("fetch should not wait for a signalled shutdown");
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_cancellable_completes_without_signal() {
        let cache = IndoorFrameCache::new(Arc::new(StaticIndoorProvider::new([details("a")])));
        let (_tx, rx) = watch::channel(false);
        let fetched = cache.fetch_cancellable("a", rx).await.unwrap();
        assert_eq!(fetched.unwrap().place_id, "a");
    }

    #[tokio::test]
    async fn test_prefetch_connected_only() {
        let provider = Arc::new(StaticIndoorProvider::new([details("a"), details("b")]));
        let cache = IndoorFrameCache::new(provider);
        let boundary = |id: &str, connected: bool| Boundary {
            id: id.to_string(),
            name: id.to_string(),
            category: None,
            vertices: vec![],
            connected,
        };

        let cached = cache
            .prefetch_connected(&[
                boundary("a", true),
                boundary("b", false),
                boundary("missing", true),
            ])
            .await;
        assert_eq!(cached, 1);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("indoor.json");
        std::fs::write(
            &path,
            r#"[{
                "place_id": "1042",
                "frame": {
                    "origin": {"latitude": 28.0, "longitude": 77.0},
                    "width_meters": 20.0,
                    "height_meters": 10.0
                },
                "points_of_interest": [
                    {"id": "r", "name": "Reception", "position": {"x": 2.0, "y": 3.0}, "level": "GROUND FLOOR"}
                ]
            }]"#,
        )
        .unwrap();

        let provider = StaticIndoorProvider::load_from_file(&path).unwrap();
        assert_eq!(provider.len(), 1);
        let loaded = provider.details.get("1042").unwrap();
        assert_eq!(loaded.frame.azimuth_degrees, 0.0);
        assert!(loaded.zones.is_empty());
        assert_eq!(
            loaded.points_of_interest[0].level.as_deref(),
            Some("GROUND FLOOR")
        );
    }
}
