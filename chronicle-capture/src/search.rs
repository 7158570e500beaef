//! Debounced location search
//!
//! Only the most recent keystroke's query survives a quiet period before a
//! search fires; a newer submission aborts the prior timer. Responses are
//! keyed by a generation counter so a stale response arriving after a
//! newer query can never update visible results.

use crate::client::LocationService;
use chronicle_common::events::CaptureEvent;
use chronicle_common::{time, CaptureConfig, EventBus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Debounced, stale-dropping location search
#[derive(Clone)]
pub struct DebouncedLocationSearch {
    locations: Arc<dyn LocationService>,
    events: EventBus,
    debounce: Duration,
    limit: usize,
    generation: Arc<AtomicU64>,
    pending: Arc<StdMutex<Option<JoinHandle<()>>>>,
}

impl DebouncedLocationSearch {
    pub fn new(config: &CaptureConfig, events: EventBus, locations: Arc<dyn LocationService>) -> Self {
        Self {
            locations,
            events,
            debounce: time::millis_to_duration(config.search_debounce_ms),
            limit: config.search_limit,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(StdMutex::new(None)),
        }
    }

    /// Submit the current input value
    ///
    /// Cancels any in-flight timer from a prior submission. Blank input
    /// clears results without a network call.
    pub fn submit(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(prior) = self
            .pending
            .lock()
            .expect("search pending lock poisoned")
            .take()
        {
            prior.abort();
        }

        let query = query.trim().to_string();
        if query.is_empty() {
            self.events.emit(CaptureEvent::LocationResults {
                query,
                results: Vec::new(),
                timestamp: time::now(),
            });
            return;
        }

        let search = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(search.debounce).await;
            search.run_search(query, generation).await;
        });
        *self.pending.lock().expect("search pending lock poisoned") = Some(handle);
    }

    /// Abort any pending timer (session teardown)
    pub fn shutdown(&self) {
        if let Some(prior) = self
            .pending
            .lock()
            .expect("search pending lock poisoned")
            .take()
        {
            prior.abort();
        }
    }

    async fn run_search(&self, query: String, generation: u64) {
        let result = self.locations.search_locations(&query, self.limit).await;

        // A newer query took over while this request was in flight;
        // its results own the screen now
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(query = %query, "Dropping stale search response");
            return;
        }

        match result {
            Ok(results) => {
                self.events.emit(CaptureEvent::LocationResults {
                    query,
                    results,
                    timestamp: time::now(),
                });
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Location search failed");
                self.events.emit(CaptureEvent::ActionFailed {
                    action: "location_search".to_string(),
                    message: e.to_string(),
                    timestamp: time::now(),
                });
            }
        }
    }
}
