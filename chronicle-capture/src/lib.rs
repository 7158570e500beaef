//! Chronicle capture pipeline
//!
//! Client-side media capture and quick-publish: a background media
//! ingestion queue with preprocessing and metadata enrichment, voice
//! capture with transcription, AI story generation, draft persistence,
//! debounced location search, and the publish session that coordinates
//! them. All components report progress through a shared broadcast
//! [`EventBus`](chronicle_common::EventBus).

pub mod client;
pub mod draft;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod preprocess;
pub mod preview;
pub mod search;
pub mod story;
pub mod voice;
pub mod workflow;

pub use draft::DraftStore;
pub use error::{CaptureError, CaptureResult, ValidationIssue};
pub use ingest::MediaIngestionQueue;
pub use search::DebouncedLocationSearch;
pub use story::{DescriptionVariant, StoryGenerationOrchestrator};
pub use voice::VoiceCaptureSession;
pub use workflow::{CloseOutcome, Collaborators, ComposeMode, QuickPublishSession, SessionState};
