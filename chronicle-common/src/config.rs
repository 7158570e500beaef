//! Configuration loading for the capture pipeline
//!
//! A missing or unreadable TOML file never prevents startup: compiled
//! defaults are used and a warning is logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;
const DEFAULT_MAX_VIDEO_BYTES: u64 = 200 * 1024 * 1024;
const DEFAULT_METADATA_SIZE_CEILING_BYTES: u64 = 30 * 1024 * 1024;
const DEFAULT_METADATA_TIMEOUT_MS: u64 = 5000;
const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 320;
const DEFAULT_UPLOAD_MAX_DIMENSION: u32 = 2048;
const DEFAULT_PREVIEW_JPEG_QUALITY: u8 = 60;
const DEFAULT_UPLOAD_JPEG_QUALITY: u8 = 82;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_SEARCH_LIMIT: usize = 5;
const DEFAULT_DRAFT_TTL_DAYS: i64 = 7;
const DEFAULT_RECORDING_TICK_MS: u64 = 1000;
const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Capture pipeline configuration
///
/// All fields have compiled defaults; a TOML file may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Ingestion ceiling for images, in bytes
    pub max_image_bytes: u64,
    /// Ingestion ceiling for videos, in bytes
    pub max_video_bytes: u64,
    /// Files above this size skip metadata extraction entirely
    pub metadata_size_ceiling_bytes: u64,
    /// Metadata extraction is abandoned after this many milliseconds
    pub metadata_timeout_ms: u64,
    /// Longer-side maximum for the instant preview raster
    pub preview_max_dimension: u32,
    /// Longer-side maximum for the upload raster
    pub upload_max_dimension: u32,
    /// JPEG quality for the preview raster (favors latency)
    pub preview_jpeg_quality: u8,
    /// JPEG quality for the upload raster (favors fidelity)
    pub upload_jpeg_quality: u8,
    /// Quiet period before a location search fires
    pub search_debounce_ms: u64,
    /// Maximum location results requested per search
    pub search_limit: usize,
    /// Drafts older than this are discarded on load
    pub draft_ttl_days: i64,
    /// Recording elapsed-time tick interval
    pub recording_tick_ms: u64,
    /// Broadcast channel capacity for the event bus
    pub event_bus_capacity: usize,
    /// Draft record location; resolved under the platform data dir when None
    pub draft_path: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            metadata_size_ceiling_bytes: DEFAULT_METADATA_SIZE_CEILING_BYTES,
            metadata_timeout_ms: DEFAULT_METADATA_TIMEOUT_MS,
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            upload_max_dimension: DEFAULT_UPLOAD_MAX_DIMENSION,
            preview_jpeg_quality: DEFAULT_PREVIEW_JPEG_QUALITY,
            upload_jpeg_quality: DEFAULT_UPLOAD_JPEG_QUALITY,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            draft_ttl_days: DEFAULT_DRAFT_TTL_DAYS,
            recording_tick_ms: DEFAULT_RECORDING_TICK_MS,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
            draft_path: None,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from a TOML file, falling back to defaults
    ///
    /// Missing file: warning + compiled defaults. Unparseable file is a
    /// configuration error (a present-but-broken config should not be
    /// silently ignored).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = ?path, "Config file not found; using compiled defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: CaptureConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Resolve the draft record path
    ///
    /// Priority: explicit `draft_path` → platform data dir → current dir.
    pub fn resolve_draft_path(&self) -> PathBuf {
        if let Some(path) = &self.draft_path {
            return path.clone();
        }
        dirs::data_local_dir()
            .map(|d| d.join("chronicle").join("draft.json"))
            .unwrap_or_else(|| PathBuf::from("chronicle-draft.json"))
    }

    /// Ingestion size ceiling for the given media kind
    pub fn size_ceiling(&self, kind: crate::events::MediaKind) -> u64 {
        match kind {
            crate::events::MediaKind::Image => self.max_image_bytes,
            crate::events::MediaKind::Video => self.max_video_bytes,
        }
    }
}
