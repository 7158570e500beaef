//! External collaborator seams
//!
//! The pipeline consumes every remote operation through these traits and
//! never learns transport details. [`http::HttpApiClient`] is the reference
//! implementation against the Chronicle REST backend; tests substitute
//! mocks.

pub mod http;

use crate::error::CaptureResult;
use crate::models::{
    AudioArtifact, CreatedEvent, GenerationResult, LocationHit, PhotoDescriptor, PublishPayload,
};
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// A successfully uploaded media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
}

/// A finished transcription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
}

/// Location search and reverse geocoding
#[async_trait]
pub trait LocationService: Send + Sync {
    async fn search_locations(&self, query: &str, limit: usize)
        -> CaptureResult<Vec<LocationHit>>;

    /// Best-effort: callers treat errors the same as `None`
    async fn reverse_geocode(&self, latitude: f64, longitude: f64)
        -> CaptureResult<Option<String>>;
}

/// Background media upload
#[async_trait]
pub trait MediaUploadService: Send + Sync {
    async fn upload_image(&self, file_name: &str, bytes: Bytes) -> CaptureResult<UploadedMedia>;
    async fn upload_video(&self, file_name: &str, bytes: Bytes) -> CaptureResult<UploadedMedia>;
}

/// Audio transcription
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe_audio(&self, artifact: &AudioArtifact) -> CaptureResult<Transcript>;
}

/// AI story generation
#[async_trait]
pub trait StoryService: Send + Sync {
    async fn generate_story(
        &self,
        photos: &[PhotoDescriptor],
        free_text: &str,
    ) -> CaptureResult<GenerationResult>;
}

/// Event creation and per-photo caption persistence
#[async_trait]
pub trait EventService: Send + Sync {
    /// Fails with [`crate::CaptureError::QuotaExceeded`] when the caller's
    /// plan limits are reached
    async fn create_event(
        &self,
        payload: &PublishPayload,
        publish: bool,
    ) -> CaptureResult<CreatedEvent>;

    async fn create_event_image(
        &self,
        event_id: Uuid,
        url: &str,
        caption: &str,
        order: usize,
    ) -> CaptureResult<()>;
}

/// Audio capture hardware seam
///
/// Acquisition fails with [`crate::CaptureError::ResourceUnavailable`] when
/// the device is denied or missing; callers surface this rather than
/// silently continuing.
#[async_trait]
pub trait AudioCaptureDevice: Send + Sync {
    async fn acquire(&self) -> CaptureResult<Box<dyn ActiveRecording>>;
}

/// An in-progress recording
///
/// Finalization is asynchronous: the artifact is not guaranteed available
/// in the same tick `stop()` returns. Dropping without finalizing discards
/// the recording.
#[async_trait]
pub trait ActiveRecording: Send {
    async fn finalize(self: Box<Self>) -> CaptureResult<AudioArtifact>;
}
