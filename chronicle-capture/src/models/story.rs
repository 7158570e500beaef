//! Story generation inputs and results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-photo input descriptor for story generation
///
/// One per ready image: remote URL plus whatever best-effort enrichment
/// (coordinates, place name, capture time) is available at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_name: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
}

/// One generated caption, keyed by the photo's remote URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoCaption {
    pub media_url: String,
    pub caption: String,
}

/// Result of one AI generation call
///
/// Immutable once produced; a later generation replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub suggested_title: Option<String>,
    pub suggested_category: Option<String>,
    pub suggested_location_name: Option<String>,
    /// The free text the user supplied, verbatim
    pub original_text: String,
    /// Generated narrative markup
    pub enhanced_html: String,
    /// Ordered per-photo captions
    pub photo_captions: Vec<PhotoCaption>,
}
