//! Media item type definitions
//!
//! Supporting types for tracked-media lifecycle events.

use serde::{Deserialize, Serialize};

/// Kind of tracked media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Upload lifecycle status of a tracked media item
///
/// `Failed` appears only in the event protocol: items observed failing are
/// removed from the queue outright and never retained as placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Registered, upload not yet started
    Pending,
    /// Upload request in flight
    Uploading,
    /// Upload completed, remote URL available
    Ready,
    /// Upload failed (terminal; the item is removed)
    Failed,
}

impl UploadStatus {
    /// True once the remote URL is available
    pub fn is_ready(&self) -> bool {
        matches!(self, UploadStatus::Ready)
    }

    /// True while an upload request is outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadStatus::Uploading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::Uploading).unwrap(),
            "\"uploading\""
        );
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
    }

    #[test]
    fn test_ready_predicate() {
        assert!(UploadStatus::Ready.is_ready());
        assert!(!UploadStatus::Pending.is_ready());
        assert!(UploadStatus::Uploading.is_in_flight());
    }
}
