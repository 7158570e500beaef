//! Debounced location search integration tests

mod helpers;

use chronicle_common::events::CaptureEvent;
use chronicle_common::{CaptureConfig, EventBus};
use chronicle_capture::search::DebouncedLocationSearch;
use helpers::{init_test_logging, MockLocations};
use std::sync::Arc;
use std::time::Duration;

fn search_with(locations: Arc<MockLocations>) -> (DebouncedLocationSearch, EventBus) {
    let bus = EventBus::new(64);
    let search = DebouncedLocationSearch::new(&CaptureConfig::default(), bus.clone(), locations);
    (search, bus)
}

#[tokio::test(start_paused = true)]
async fn test_rapid_input_collapses_to_one_search() {
    init_test_logging();
    let locations = Arc::new(MockLocations::default());
    let (search, bus) = search_with(locations.clone());
    let mut rx = bus.subscribe();

    search.submit("Par");
    search.submit("Pari");
    search.submit("Paris");

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no results published")
        .unwrap();
    match event {
        CaptureEvent::LocationResults { query, results, .. } => {
            assert_eq!(query, "Paris");
            assert_eq!(results.len(), 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    // Only the final query ever reached the service
    assert_eq!(locations.recorded_queries(), vec!["Paris"]);
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_clears_results_without_a_call() {
    init_test_logging();
    let locations = Arc::new(MockLocations::default());
    let (search, bus) = search_with(locations.clone());
    let mut rx = bus.subscribe();

    search.submit("Par");
    search.submit("   ");

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no results published")
        .unwrap();
    match event {
        CaptureEvent::LocationResults { query, results, .. } => {
            assert_eq!(query, "");
            assert!(results.is_empty());
        }
        other => panic!("unexpected event: {:?}", other),
    }
    // Blank input also cancelled the earlier pending query
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(locations.recorded_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_pending_query() {
    init_test_logging();
    let locations = Arc::new(MockLocations::default());
    let (search, _bus) = search_with(locations.clone());

    search.submit("Paris");
    search.shutdown();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(locations.recorded_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_settled_queries_each_fire() {
    init_test_logging();
    let locations = Arc::new(MockLocations::default());
    let (search, bus) = search_with(locations.clone());
    let mut rx = bus.subscribe();

    search.submit("Paris");
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no results")
        .unwrap();

    search.submit("Lyon");
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no results")
        .unwrap();

    assert_eq!(locations.recorded_queries(), vec!["Paris", "Lyon"]);
}
