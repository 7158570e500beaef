//! Reference HTTP collaborator client
//!
//! Implements every collaborator trait against the Chronicle REST backend.
//! Transport failures map to `CaptureError::Transient`; the one
//! distinguishable business failure is the publish quota (HTTP 402 →
//! `CaptureError::QuotaExceeded`).

use crate::client::{
    EventService, LocationService, MediaUploadService, StoryService, TranscriptionService,
    Transcript, UploadedMedia,
};
use crate::error::{CaptureError, CaptureResult};
use crate::models::{
    AudioArtifact, CreatedEvent, GenerationResult, LocationHit, PhotoCaption, PhotoDescriptor,
    PublishPayload,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default timeout for API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header for all backend calls
const USER_AGENT: &str = "chronicle-capture/0.1.0";

/// Chronicle backend client
pub struct HttpApiClient {
    http_client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>) -> CaptureResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                CaptureError::Common(chronicle_common::Error::Internal(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn upload_media(
        &self,
        path: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> CaptureResult<UploadedMedia> {
        let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transient("upload", e))?
            .error_for_status()
            .map_err(|e| transient("upload", e))?;

        let dto: UploadResponse = response.json().await.map_err(|e| transient("upload", e))?;
        debug!(file_name, url = %dto.url, "Upload completed");
        Ok(UploadedMedia { url: dto.url })
    }
}

fn transient(context: &str, err: reqwest::Error) -> CaptureError {
    CaptureError::Transient(format!("{} request failed: {}", context, err))
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Deserialize)]
struct LocationSearchResponse {
    results: Vec<LocationHit>,
}

#[derive(Deserialize)]
struct ReverseGeocodeResponse {
    name: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    photos: &'a [PhotoDescriptor],
    free_text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    suggested_title: Option<String>,
    suggested_category: Option<String>,
    suggested_location_name: Option<String>,
    original_text: String,
    enhanced_html: String,
    #[serde(default)]
    photo_captions: Vec<PhotoCaption>,
}

#[derive(Deserialize)]
struct CreateEventResponse {
    id: Uuid,
    slug: String,
}

#[derive(Serialize)]
struct CreateEventImageRequest<'a> {
    url: &'a str,
    caption: &'a str,
    order: usize,
}

#[async_trait]
impl LocationService for HttpApiClient {
    async fn search_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> CaptureResult<Vec<LocationHit>> {
        let response = self
            .http_client
            .get(self.url("/api/locations/search"))
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| transient("location search", e))?
            .error_for_status()
            .map_err(|e| transient("location search", e))?;

        let dto: LocationSearchResponse = response
            .json()
            .await
            .map_err(|e| transient("location search", e))?;
        Ok(dto.results)
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> CaptureResult<Option<String>> {
        let response = self
            .http_client
            .get(self.url("/api/locations/reverse"))
            .query(&[("lat", latitude), ("lon", longitude)])
            .send()
            .await
            .map_err(|e| transient("reverse geocode", e))?
            .error_for_status()
            .map_err(|e| transient("reverse geocode", e))?;

        let dto: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|e| transient("reverse geocode", e))?;
        Ok(dto.name)
    }
}

#[async_trait]
impl MediaUploadService for HttpApiClient {
    async fn upload_image(&self, file_name: &str, bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.upload_media("/api/media/images", file_name, bytes).await
    }

    async fn upload_video(&self, file_name: &str, bytes: Bytes) -> CaptureResult<UploadedMedia> {
        self.upload_media("/api/media/videos", file_name, bytes).await
    }
}

#[async_trait]
impl TranscriptionService for HttpApiClient {
    async fn transcribe_audio(&self, artifact: &AudioArtifact) -> CaptureResult<Transcript> {
        let part = multipart::Part::bytes(artifact.bytes.to_vec())
            .file_name("recording")
            .mime_str(&artifact.mime)
            .map_err(|e| CaptureError::Transient(format!("invalid audio mime type: {}", e)))?;
        let form = multipart::Form::new().part("audio", part);

        let response = self
            .http_client
            .post(self.url("/api/transcriptions"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transient("transcription", e))?
            .error_for_status()
            .map_err(|e| transient("transcription", e))?;

        let dto: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| transient("transcription", e))?;
        Ok(Transcript { text: dto.text })
    }
}

#[async_trait]
impl StoryService for HttpApiClient {
    async fn generate_story(
        &self,
        photos: &[PhotoDescriptor],
        free_text: &str,
    ) -> CaptureResult<GenerationResult> {
        let response = self
            .http_client
            .post(self.url("/api/stories/generate"))
            .json(&GenerateRequest { photos, free_text })
            .send()
            .await
            .map_err(|e| transient("story generation", e))?
            .error_for_status()
            .map_err(|e| transient("story generation", e))?;

        let dto: GenerateResponse = response
            .json()
            .await
            .map_err(|e| transient("story generation", e))?;

        Ok(GenerationResult {
            suggested_title: dto.suggested_title,
            suggested_category: dto.suggested_category,
            suggested_location_name: dto.suggested_location_name,
            original_text: dto.original_text,
            enhanced_html: dto.enhanced_html,
            photo_captions: dto.photo_captions,
        })
    }
}

#[async_trait]
impl EventService for HttpApiClient {
    async fn create_event(
        &self,
        payload: &PublishPayload,
        publish: bool,
    ) -> CaptureResult<CreatedEvent> {
        let response = self
            .http_client
            .post(self.url("/api/events"))
            .query(&[("publish", publish)])
            .json(payload)
            .send()
            .await
            .map_err(|e| transient("publish", e))?;

        // Plan limits are the one business failure callers must be able to
        // distinguish (routes to the upgrade path, not a generic notice)
        if response.status() == StatusCode::PAYMENT_REQUIRED {
            return Err(CaptureError::QuotaExceeded);
        }

        let response = response
            .error_for_status()
            .map_err(|e| transient("publish", e))?;

        let dto: CreateEventResponse =
            response.json().await.map_err(|e| transient("publish", e))?;
        Ok(CreatedEvent {
            id: dto.id,
            slug: dto.slug,
        })
    }

    async fn create_event_image(
        &self,
        event_id: Uuid,
        url: &str,
        caption: &str,
        order: usize,
    ) -> CaptureResult<()> {
        self.http_client
            .post(self.url(&format!("/api/events/{}/images", event_id)))
            .json(&CreateEventImageRequest { url, caption, order })
            .send()
            .await
            .map_err(|e| transient("caption save", e))?
            .error_for_status()
            .map_err(|e| transient("caption save", e))?;
        Ok(())
    }
}
