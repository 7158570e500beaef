//! Extracted media metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
///
/// Only ever constructed when both components were valid in the source
/// tags; a lone latitude or longitude is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Metadata extracted once per original file, immutable thereafter
///
/// Attached to a tracked item by its stable id at extraction time (the
/// remote URL does not exist yet). Strictly best-effort: extraction
/// failures yield no metadata, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// GPS coordinates, present only when both components resolved
    pub coordinates: Option<GeoPoint>,
    /// Capture timestamp, independent of coordinates
    pub captured_at: Option<DateTime<Utc>>,
}

impl ExtractedMetadata {
    /// True when nothing at all was extracted
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_none() && self.captured_at.is_none()
    }
}
