use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::app::ports::{GeocodeResult, GeocoderPort};
use crate::error::ScraperError;
use crate::observability::metrics;

/// Memoized geocoder responses keyed by the exact location text.
///
/// Entries live as long as the cache does; nothing is evicted. Each key owns a
/// once-cell, so concurrent lookups of the same location share one provider
/// call. A failed lookup leaves its cell empty and the next caller retries.
#[derive(Default)]
pub struct GeocodeCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<GeocodeResult>>>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, location: &str) -> Arc<OnceCell<GeocodeResult>> {
        let mut entries = self.entries.lock().await;
        if let Some(slot) = entries.get(location) {
            return slot.clone();
        }
        let slot = Arc::new(OnceCell::new());
        entries.insert(location.to_string(), slot.clone());
        slot
    }

    /// Cached result for `location`, if a lookup has already succeeded
    pub async fn get(&self, location: &str) -> Option<GeocodeResult> {
        let entries = self.entries.lock().await;
        entries.get(location).and_then(|slot| slot.get().cloned())
    }

    /// Number of locations with a stored result
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Resolves free-text locations to coordinates through a shared cache
pub struct GeocodeEnricher {
    geocoder: Arc<dyn GeocoderPort>,
    cache: Arc<GeocodeCache>,
}

impl GeocodeEnricher {
    pub fn new(geocoder: Arc<dyn GeocoderPort>, cache: Arc<GeocodeCache>) -> Self {
        Self { geocoder, cache }
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Look up `location` as-is. Never fails: provider errors are logged and
    /// yield an empty result.
    pub async fn resolve(&self, location: &str) -> GeocodeResult {
        match self.lookup(location).await {
            Lookup::Cached(result) => {
                metrics::geocode::cache_hit();
                result
            }
            Lookup::Fetched(result) => {
                debug!(location, "Geocoded location");
                result
            }
            Lookup::Failed(e) => {
                metrics::geocode::failure();
                warn!(location, error = %e, "Geocoding failed, continuing without coordinates");
                GeocodeResult::new()
            }
        }
    }

    /// Serve from the cache, or call the provider if this caller is the one
    /// initializing the slot. Callers that wait on another caller's in-flight
    /// lookup count as cached.
    async fn lookup(&self, location: &str) -> Lookup {
        let slot = self.cache.slot(location).await;
        let fetched = AtomicBool::new(false);

        let outcome = {
            let fetched = &fetched;
            let geocoder = &self.geocoder;
            slot.get_or_try_init(|| async move {
                fetched.store(true, Ordering::Relaxed);
                metrics::geocode::cache_miss();
                let started = Instant::now();
                let result = geocoder.geocode(location).await;
                metrics::geocode::lookup_duration(started.elapsed().as_secs_f64());
                result
            })
            .await
        };

        match outcome {
            Ok(result) if fetched.load(Ordering::Relaxed) => Lookup::Fetched(result.clone()),
            Ok(result) => Lookup::Cached(result.clone()),
            Err(e) => Lookup::Failed(e),
        }
    }
}

/// Where a resolved location came from
#[derive(Debug)]
enum Lookup {
    Cached(GeocodeResult),
    Fetched(GeocodeResult),
    Failed(ScraperError),
}
