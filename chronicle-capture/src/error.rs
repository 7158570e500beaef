//! Error types for the capture pipeline
//!
//! Best-effort lookups (metadata, reverse geocode, place names) never
//! produce these errors: they are `Option`s swallowed at the component
//! boundary. Everything here is surfaced to the user, once, per action.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for capture pipeline operations
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Capture pipeline error taxonomy
#[derive(Debug, Error)]
pub enum CaptureError {
    /// User input violates one or more validation rules
    ///
    /// Accumulated (never fail-fast) and rendered as a list; never fatal.
    #[error("Validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// A collaborator call failed (upload/search/generate/transcribe)
    ///
    /// Surfaced as a dismissible notice; the affected state is rolled back
    /// to its pre-attempt shape and nothing retries automatically.
    #[error("{0}")]
    Transient(String),

    /// Capture device denied or missing; blocks that feature only
    #[error("Capture device unavailable: {0}")]
    ResourceUnavailable(String),

    /// Publish rejected by plan limits; callers route to the upgrade path
    #[error("Publish quota exceeded for the current plan")]
    QuotaExceeded,

    /// Story generation requires at least one ready photo or some text
    #[error("Add at least one uploaded photo or some text before generating")]
    InsufficientInput,

    /// Shared infrastructure error
    #[error(transparent)]
    Common(#[from] chronicle_common::Error),
}

/// A single violated validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Manual mode requires at least one uploaded image
    ImageRequired,
    /// Assisted mode requires a generated story before publishing
    GenerationRequired,
    /// One or more media uploads have not completed yet
    UploadsInFlight,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::ImageRequired => {
                write!(f, "Add at least one image before publishing")
            }
            ValidationIssue::GenerationRequired => {
                write!(f, "Generate a story before publishing in assisted mode")
            }
            ValidationIssue::UploadsInFlight => {
                write!(f, "Wait for media uploads to finish")
            }
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
