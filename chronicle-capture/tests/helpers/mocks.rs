//! Mock collaborators
//!
//! In-memory implementations of the client seams with call recording and
//! configurable failure modes.

use async_trait::async_trait;
use bytes::Bytes;
use chronicle_capture::client::{
    ActiveRecording, AudioCaptureDevice, EventService, LocationService, MediaUploadService,
    StoryService, Transcript, TranscriptionService, UploadedMedia,
};
use chronicle_capture::error::{CaptureError, CaptureResult};
use chronicle_capture::models::{
    AudioArtifact, CreatedEvent, GenerationResult, LocationHit, PhotoCaption, PhotoDescriptor,
    PublishPayload,
};
use chronicle_capture::workflow::Collaborators;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Upload service with a configurable delay and failure switch
#[derive(Default)]
pub struct MockUploader {
    pub delay: Option<Duration>,
    pub fail: bool,
    pub uploads: AtomicUsize,
}

impl MockUploader {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    async fn upload(&self, file_name: &str) -> CaptureResult<UploadedMedia> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CaptureError::Transient("upload refused".to_string()));
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", file_name),
        })
    }
}

#[async_trait]
impl MediaUploadService for MockUploader {
    async fn upload_image(&self, file_name: &str, _bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.upload(file_name).await
    }

    async fn upload_video(&self, file_name: &str, _bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.upload(file_name).await
    }
}

/// Upload service that parks until the test releases it
///
/// One `release()` call lets one upload proceed, whether it is already
/// waiting or arrives later.
#[derive(Default)]
pub struct GatedUploader {
    gate: tokio::sync::Notify,
    pub uploads: AtomicUsize,
}

impl GatedUploader {
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaUploadService for GatedUploader {
    async fn upload_image(&self, file_name: &str, _bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.gate.notified().await;
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", file_name),
        })
    }

    async fn upload_video(&self, file_name: &str, _bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.gate.notified().await;
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", file_name),
        })
    }
}

/// Location service recording every search query
#[derive(Default)]
pub struct MockLocations {
    pub queries: Mutex<Vec<String>>,
    pub place_name: Option<String>,
}

impl MockLocations {
    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationService for MockLocations {
    async fn search_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> CaptureResult<Vec<LocationHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![LocationHit {
            name: format!("{} Town Hall", query),
            latitude: 48.85,
            longitude: 2.35,
            kind: Some("building".to_string()),
            address: None,
        }]
        .into_iter()
        .take(limit)
        .collect())
    }

    async fn reverse_geocode(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> CaptureResult<Option<String>> {
        Ok(self.place_name.clone())
    }
}

/// Transcription service returning a fixed transcript
pub struct MockTranscriber {
    pub text: String,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self {
            text: "we walked along the shore".to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionService for MockTranscriber {
    async fn transcribe_audio(&self, _artifact: &AudioArtifact) -> CaptureResult<Transcript> {
        Ok(Transcript {
            text: self.text.clone(),
        })
    }
}

/// Story service returning a canned result
pub struct MockStories {
    pub result: GenerationResult,
}

impl Default for MockStories {
    fn default() -> Self {
        Self {
            result: GenerationResult {
                suggested_title: Some("A quiet afternoon".to_string()),
                suggested_category: Some("daily-life".to_string()),
                suggested_location_name: Some("Old Harbor".to_string()),
                original_text: "we walked".to_string(),
                enhanced_html: "<p>We walked along the old harbor.</p>".to_string(),
                photo_captions: Vec::new(),
            },
        }
    }
}

impl MockStories {
    pub fn with_captions(urls: &[&str]) -> Self {
        let mut mock = Self::default();
        mock.result.photo_captions = urls
            .iter()
            .map(|url| PhotoCaption {
                media_url: url.to_string(),
                caption: "A caption".to_string(),
            })
            .collect();
        mock
    }
}

#[async_trait]
impl StoryService for MockStories {
    async fn generate_story(
        &self,
        _photos: &[PhotoDescriptor],
        _free_text: &str,
    ) -> CaptureResult<GenerationResult> {
        Ok(self.result.clone())
    }
}

/// Event creation service with quota and caption failure switches
#[derive(Default)]
pub struct MockPublisher {
    pub quota_exceeded: bool,
    pub fail_create: bool,
    pub fail_captions: bool,
    pub created: Mutex<Vec<PublishPayload>>,
    pub captions: Mutex<Vec<(Uuid, String, String, usize)>>,
}

impl MockPublisher {
    pub fn created_payloads(&self) -> Vec<PublishPayload> {
        self.created.lock().unwrap().clone()
    }

    pub fn recorded_captions(&self) -> Vec<(Uuid, String, String, usize)> {
        self.captions.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventService for MockPublisher {
    async fn create_event(
        &self,
        payload: &PublishPayload,
        _publish: bool,
    ) -> CaptureResult<CreatedEvent> {
        if self.quota_exceeded {
            return Err(CaptureError::QuotaExceeded);
        }
        if self.fail_create {
            return Err(CaptureError::Transient("server unavailable".to_string()));
        }
        self.created.lock().unwrap().push(payload.clone());
        Ok(CreatedEvent {
            id: Uuid::new_v4(),
            slug: "a-quiet-afternoon".to_string(),
        })
    }

    async fn create_event_image(
        &self,
        event_id: Uuid,
        url: &str,
        caption: &str,
        order: usize,
    ) -> CaptureResult<()> {
        if self.fail_captions {
            return Err(CaptureError::Transient("caption refused".to_string()));
        }
        self.captions
            .lock()
            .unwrap()
            .push((event_id, url.to_string(), caption.to_string(), order));
        Ok(())
    }
}

/// Audio device with a failure switch
#[derive(Default)]
pub struct MockAudioDevice {
    pub unavailable: bool,
}

#[async_trait]
impl AudioCaptureDevice for MockAudioDevice {
    async fn acquire(&self) -> CaptureResult<Box<dyn ActiveRecording>> {
        if self.unavailable {
            return Err(CaptureError::ResourceUnavailable(
                "microphone denied".to_string(),
            ));
        }
        Ok(Box::new(MockRecording))
    }
}

struct MockRecording;

#[async_trait]
impl ActiveRecording for MockRecording {
    async fn finalize(self: Box<Self>) -> CaptureResult<AudioArtifact> {
        Ok(AudioArtifact {
            bytes: Bytes::from_static(b"audio"),
            mime: "audio/webm".to_string(),
            duration_seconds: 3.0,
        })
    }
}

/// Audio device whose recordings park in `finalize` until released
///
/// One `release()` call lets one finalization proceed, whether it is
/// already waiting or arrives later.
#[derive(Default)]
pub struct GatedAudioDevice {
    gate: Arc<tokio::sync::Notify>,
}

impl GatedAudioDevice {
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl AudioCaptureDevice for GatedAudioDevice {
    async fn acquire(&self) -> CaptureResult<Box<dyn ActiveRecording>> {
        Ok(Box::new(GatedRecording {
            gate: self.gate.clone(),
        }))
    }
}

struct GatedRecording {
    gate: Arc<tokio::sync::Notify>,
}

#[async_trait]
impl ActiveRecording for GatedRecording {
    async fn finalize(self: Box<Self>) -> CaptureResult<AudioArtifact> {
        self.gate.notified().await;
        Ok(AudioArtifact {
            bytes: Bytes::from_static(b"audio"),
            mime: "audio/webm".to_string(),
            duration_seconds: 3.0,
        })
    }
}

/// Collaborator bundle with every seam mocked and overridable
pub fn collaborators(
    uploader: Arc<MockUploader>,
    locations: Arc<MockLocations>,
    stories: Arc<MockStories>,
    publisher: Arc<MockPublisher>,
) -> Collaborators {
    Collaborators {
        uploader,
        locations,
        transcriber: Arc::new(MockTranscriber::default()),
        stories,
        publisher,
        audio: Arc::new(MockAudioDevice::default()),
    }
}
