//! Data model for the capture pipeline

mod draft;
mod form;
mod media;
mod metadata;
mod publish;
mod story;
mod voice;

pub use draft::{DraftMediaRef, DraftSnapshot};
pub use form::EntryForm;
pub use media::{MediaView, SelectedFile, TrackedMedia};
pub use metadata::{ExtractedMetadata, GeoPoint};
pub use publish::{CreatedEvent, PrivacyLevel, PublishPayload};
pub use story::{GenerationResult, PhotoCaption, PhotoDescriptor};
pub use voice::AudioArtifact;

// Shared with the event protocol
pub use chronicle_common::events::{LocationHit, MediaKind, RecordingState, UploadStatus};
