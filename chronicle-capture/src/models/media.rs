//! Tracked media items

use crate::models::{ExtractedMetadata, MediaKind, UploadStatus};
use crate::preview::PreviewHandle;
use bytes::Bytes;
use uuid::Uuid;

/// A raw user-selected file, before validation
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original file name
    pub name: String,
    /// MIME type as reported by the picker ("image/jpeg", "video/mp4", ...)
    pub mime: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Media kind from the MIME type; None for anything not image/video
    pub fn kind(&self) -> Option<MediaKind> {
        if self.mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if self.mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One tracked item per accepted file
///
/// Owned exclusively by the ingestion queue; every other component sees
/// read-only [`MediaView`] snapshots. Dropping the item releases its
/// preview resource.
#[derive(Debug)]
pub struct TrackedMedia {
    /// Stable identity assigned at ingestion time; all async completions
    /// key their updates by this, never by list position
    pub id: Uuid,
    pub kind: MediaKind,
    pub status: UploadStatus,
    pub file_name: String,
    /// Original file size in bytes
    pub original_size: u64,
    /// Local preview resource, valid for this session only
    pub preview: PreviewHandle,
    /// Remote URL, absent until upload completes
    pub remote_url: Option<String>,
    /// Best-effort extracted metadata
    pub metadata: Option<ExtractedMetadata>,
    /// Best-effort resolved place name
    pub place_name: Option<String>,
}

impl TrackedMedia {
    /// True once the remote URL is available
    pub fn is_ready(&self) -> bool {
        self.status.is_ready() && self.remote_url.is_some()
    }

    /// Read-only snapshot for consumers outside the queue
    pub fn view(&self) -> MediaView {
        MediaView {
            id: self.id,
            kind: self.kind,
            status: self.status,
            file_name: self.file_name.clone(),
            preview_id: self.preview.id(),
            preview_bytes: self.preview.bytes().clone(),
            remote_url: self.remote_url.clone(),
            metadata: self.metadata,
            place_name: self.place_name.clone(),
        }
    }
}

/// Read-only snapshot of a tracked item
#[derive(Debug, Clone)]
pub struct MediaView {
    pub id: Uuid,
    pub kind: MediaKind,
    pub status: UploadStatus,
    pub file_name: String,
    pub preview_id: Uuid,
    pub preview_bytes: Bytes,
    pub remote_url: Option<String>,
    pub metadata: Option<ExtractedMetadata>,
    pub place_name: Option<String>,
}

impl MediaView {
    pub fn is_ready(&self) -> bool {
        self.status.is_ready() && self.remote_url.is_some()
    }

    /// True for an uploaded image (the only inputs story generation uses)
    pub fn is_ready_image(&self) -> bool {
        self.kind == MediaKind::Image && self.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        let image = SelectedFile {
            name: "a.jpg".into(),
            mime: "image/jpeg".into(),
            bytes: Bytes::new(),
        };
        let video = SelectedFile {
            name: "b.mp4".into(),
            mime: "video/mp4".into(),
            bytes: Bytes::new(),
        };
        let other = SelectedFile {
            name: "c.pdf".into(),
            mime: "application/pdf".into(),
            bytes: Bytes::new(),
        };
        assert_eq!(image.kind(), Some(MediaKind::Image));
        assert_eq!(video.kind(), Some(MediaKind::Video));
        assert_eq!(other.kind(), None);
    }
}
