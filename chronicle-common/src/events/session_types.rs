//! Session-level type definitions
//!
//! Supporting types for voice capture and location search events.

use serde::{Deserialize, Serialize};

/// Voice capture session state
///
/// Transitions are user- or completion-triggered only:
/// `Idle → Recording → Idle` (cleared) or
/// `Recording → Transcribing → Idle` (automatic hand-off once the audio
/// artifact exists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording,
    Transcribing,
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "idle"),
            RecordingState::Recording => write!(f, "recording"),
            RecordingState::Transcribing => write!(f, "transcribing"),
        }
    }
}

/// One result row from a location search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationHit {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Result kind as reported by the geocoder (city, poi, address, ...)
    pub kind: Option<String>,
    pub address: Option<String>,
}
