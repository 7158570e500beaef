//! Locally persisted draft snapshot

use crate::models::{LocationHit, MediaKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reference to an already-uploaded media item
///
/// Remote URLs only: local preview handles are invalid across sessions and
/// are unrepresentable here by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMediaRef {
    pub url: String,
    pub kind: MediaKind,
}

/// Snapshot of an in-progress, unpublished entry
///
/// Persisted as a single keyed record; re-saving overwrites, never
/// accumulates history. Expires `draft_ttl_days` after `saved_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub title: String,
    pub narrative_text: String,
    /// Raw dictation transcript, kept separate from the narrative
    pub dictation_text: String,
    pub date: NaiveDate,
    pub location: Option<LocationHit>,
    pub category: String,
    /// Only media whose upload already completed; in-flight items are
    /// never serialized
    pub media: Vec<DraftMediaRef>,
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    /// Age of this snapshot relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.saved_at
    }
}
