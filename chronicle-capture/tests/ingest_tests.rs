//! Media ingestion queue integration tests
//!
//! Drives the queue end to end against mock collaborators: validation
//! rejections, the background upload pipeline, dismissal during upload,
//! and session teardown.

mod helpers;

use bytes::Bytes;
use chronicle_capture::ingest::MediaIngestionQueue;
use chronicle_common::events::CaptureEvent;
use chronicle_common::{CaptureConfig, EventBus};
use helpers::{
    gps_tagged_tiff, init_test_logging, png_file, selected_file, GatedUploader, MockLocations,
    MockUploader,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

async fn next_event<F>(rx: &mut Receiver<CaptureEvent>, pred: F) -> CaptureEvent
where
    F: Fn(&CaptureEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event bus closed: {}", e),
            }
        }
    })
    .await
    .expect("expected event was not emitted")
}

fn queue_with(
    uploader: Arc<dyn chronicle_capture::client::MediaUploadService>,
) -> (MediaIngestionQueue, EventBus) {
    let bus = EventBus::new(64);
    let queue = MediaIngestionQueue::new(
        Arc::new(CaptureConfig::default()),
        bus.clone(),
        uploader,
        Arc::new(MockLocations::default()),
    );
    (queue, bus)
}

#[tokio::test(start_paused = true)]
async fn test_oversized_file_is_rejected_without_registration() {
    init_test_logging();
    let bus = EventBus::new(64);
    let config = CaptureConfig {
        max_image_bytes: 16,
        ..CaptureConfig::default()
    };
    let queue = MediaIngestionQueue::new(
        Arc::new(config),
        bus.clone(),
        Arc::new(MockUploader::default()),
        Arc::new(MockLocations::default()),
    );
    let mut rx = bus.subscribe();

    queue
        .ingest(vec![selected_file(
            "huge.png",
            "image/png",
            Bytes::from(vec![0u8; 64]),
        )])
        .await;

    let event = next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRejected { .. })).await;
    match event {
        CaptureEvent::MediaRejected { file_name, .. } => assert_eq!(file_name, "huge.png"),
        _ => unreachable!(),
    }
    assert_eq!(queue.item_count().await, 0);
    assert_eq!(queue.preview_registry().live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_type_is_rejected_but_rest_of_selection_proceeds() {
    init_test_logging();
    let (queue, bus) = queue_with(Arc::new(MockUploader::default()));
    let mut rx = bus.subscribe();

    queue
        .ingest(vec![
            selected_file("doc.pdf", "application/pdf", Bytes::from_static(b"%PDF")),
            png_file("keep.png"),
        ])
        .await;

    next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRejected { .. })).await;
    next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MediaRegistered { file_name, .. } if file_name == "keep.png")
    })
    .await;
    assert_eq!(queue.item_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_image_upload_completes_in_background() {
    init_test_logging();
    let uploader = Arc::new(MockUploader::default());
    let (queue, bus) = queue_with(uploader.clone());
    let mut rx = bus.subscribe();

    queue.ingest(vec![png_file("walk.png")]).await;

    let registered =
        next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRegistered { .. })).await;
    let item_id = match registered {
        CaptureEvent::MediaRegistered { item_id, .. } => item_id,
        _ => unreachable!(),
    };

    let completed = next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MediaUploadCompleted { .. })
    })
    .await;
    match completed {
        CaptureEvent::MediaUploadCompleted { item_id: got, url, .. } => {
            assert_eq!(got, item_id);
            assert_eq!(url, "https://cdn.test/walk.png");
        }
        _ => unreachable!(),
    }

    let ready = queue.ready_views().await;
    assert_eq!(ready.len(), 1);
    assert!(ready[0].is_ready_image());
    assert!(!queue.has_uploads_in_flight().await);
    assert_eq!(uploader.upload_count(), 1);
}

// Real time: metadata extraction runs on a blocking thread and must not
// race a paused-clock timeout
#[tokio::test]
async fn test_gps_metadata_drives_place_resolution() {
    init_test_logging();
    let bus = EventBus::new(64);
    let queue = MediaIngestionQueue::new(
        Arc::new(CaptureConfig::default()),
        bus.clone(),
        Arc::new(MockUploader::default()),
        Arc::new(MockLocations {
            place_name: Some("Montmartre".to_string()),
            ..MockLocations::default()
        }),
    );
    let mut rx = bus.subscribe();

    queue
        .ingest(vec![selected_file("shot.tif", "image/tiff", gps_tagged_tiff())])
        .await;
    let registered =
        next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRegistered { .. })).await;
    let item_id = match registered {
        CaptureEvent::MediaRegistered { item_id, .. } => item_id,
        _ => unreachable!(),
    };

    let extracted = next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MetadataExtracted { .. })
    })
    .await;
    match extracted {
        CaptureEvent::MetadataExtracted {
            item_id: got,
            latitude,
            longitude,
            captured_at,
            ..
        } => {
            assert_eq!(got, item_id);
            assert!((latitude.unwrap() - 48.85).abs() < 1e-9);
            assert!((longitude.unwrap() - 2.35).abs() < 1e-9);
            assert!(captured_at.is_some());
        }
        _ => unreachable!(),
    }

    let resolved = next_event(&mut rx, |e| matches!(e, CaptureEvent::PlaceResolved { .. })).await;
    match resolved {
        CaptureEvent::PlaceResolved {
            item_id: got,
            place_name,
            ..
        } => {
            assert_eq!(got, item_id);
            assert_eq!(place_name, "Montmartre");
        }
        _ => unreachable!(),
    }

    let views = queue.views().await;
    assert!(views[0].metadata.is_some());
    assert_eq!(views[0].place_name.as_deref(), Some("Montmartre"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_upload_removes_item_and_releases_preview() {
    init_test_logging();
    let (queue, bus) = queue_with(Arc::new(MockUploader {
        fail: true,
        ..MockUploader::default()
    }));
    let mut rx = bus.subscribe();

    queue.ingest(vec![png_file("walk.png")]).await;

    next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MediaUploadFailed { .. })
    })
    .await;
    next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRemoved { .. })).await;

    assert_eq!(queue.item_count().await, 0);
    assert_eq!(queue.preview_registry().live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_removal_during_upload_drops_late_completion() {
    init_test_logging();
    let uploader = Arc::new(GatedUploader::default());
    let (queue, bus) = queue_with(uploader.clone());
    let mut rx = bus.subscribe();

    queue.ingest(vec![png_file("walk.png")]).await;
    let registered =
        next_event(&mut rx, |e| matches!(e, CaptureEvent::MediaRegistered { .. })).await;
    let item_id = match registered {
        CaptureEvent::MediaRegistered { item_id, .. } => item_id,
        _ => unreachable!(),
    };

    // Dismiss while the upload is parked, then let it finish
    assert!(queue.remove(item_id).await);
    assert_eq!(queue.preview_registry().live_count(), 0);
    uploader.release();

    // The completed upload must not resurrect the removed item
    let late = tokio::time::timeout(Duration::from_millis(200), async {
        loop {
            if let CaptureEvent::MediaUploadCompleted { .. } =
                rx.recv().await.expect("event bus closed")
            {
                return;
            }
        }
    })
    .await;
    assert!(late.is_err(), "completion event for a removed item");
    assert_eq!(queue.item_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_abandons_pipelines_and_releases_all_previews() {
    init_test_logging();
    let uploader = Arc::new(GatedUploader::default());
    let (queue, bus) = queue_with(uploader.clone());
    let mut rx = bus.subscribe();

    queue.ingest(vec![png_file("a.png"), png_file("b.png")]).await;
    next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MediaRegistered { file_name, .. } if file_name == "b.png")
    })
    .await;
    assert_eq!(queue.item_count().await, 2);
    assert!(queue.has_uploads_in_flight().await);

    queue.reset().await;

    assert_eq!(queue.item_count().await, 0);
    assert_eq!(queue.preview_registry().live_count(), 0);
    assert!(!queue.has_uploads_in_flight().await);
    // Abandoned pipelines never reach the upload service
    uploader.release();
    uploader.release();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(uploader.upload_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restored_media_is_ready_immediately() {
    init_test_logging();
    let (queue, bus) = queue_with(Arc::new(MockUploader::default()));
    let mut rx = bus.subscribe();

    queue
        .restore_uploaded(&[chronicle_capture::models::DraftMediaRef {
            url: "https://cdn.test/old.jpg".to_string(),
            kind: chronicle_capture::models::MediaKind::Image,
        }])
        .await;

    next_event(&mut rx, |e| {
        matches!(e, CaptureEvent::MediaUploadCompleted { .. })
    })
    .await;
    let ready = queue.ready_views().await;
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].remote_url.as_deref(), Some("https://cdn.test/old.jpg"));
    assert!(!queue.has_uploads_in_flight().await);
}

#[tokio::test(start_paused = true)]
async fn test_views_preserve_selection_order() {
    init_test_logging();
    let (queue, _bus) = queue_with(Arc::new(MockUploader::default()));

    queue
        .ingest(vec![png_file("first.png"), png_file("second.png")])
        .await;

    let names: Vec<String> = queue
        .views()
        .await
        .into_iter()
        .map(|v| v.file_name)
        .collect();
    assert_eq!(names, vec!["first.png", "second.png"]);
}
