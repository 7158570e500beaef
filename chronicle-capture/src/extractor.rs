//! Best-effort metadata extraction
//!
//! Pulls GPS coordinates and the capture timestamp out of an original
//! image's EXIF tags. Strictly best-effort: oversized files are skipped,
//! the parse races a timeout, and every failure mode yields `None`. A miss
//! never affects the ingestion pipeline.

use crate::models::{ExtractedMetadata, GeoPoint};
use bytes::Bytes;
use chrono::{NaiveDateTime, TimeZone, Utc};
use chronicle_common::{time, CaptureConfig};
use exif::{In, Tag, Value};
use std::time::Duration;
use tracing::debug;

/// Metadata extractor with a size ceiling and a parse timeout
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    /// Files above this size are skipped without attempting extraction
    size_ceiling: u64,
    timeout: Duration,
}

impl MetadataExtractor {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            size_ceiling: config.metadata_size_ceiling_bytes,
            timeout: time::millis_to_duration(config.metadata_timeout_ms),
        }
    }

    /// Extract metadata from an original file
    ///
    /// Returns `None` for oversized files, timeouts, parse failures, and
    /// files carrying no usable tags. When the timer wins the race the
    /// parse is abandoned; there is no retry.
    pub async fn extract(&self, bytes: Bytes, file_name: &str) -> Option<ExtractedMetadata> {
        if bytes.len() as u64 > self.size_ceiling {
            debug!(
                file_name,
                size = bytes.len(),
                ceiling = self.size_ceiling,
                "Skipping metadata extraction for oversized file"
            );
            return None;
        }

        let name = file_name.to_string();
        let result =
            race_with_timeout(self.timeout, move || parse_exif(&bytes, &name)).await;

        if result.is_none() {
            debug!(file_name, "No metadata extracted");
        }
        result
    }
}

/// Run blocking work with a deadline; the timer winning abandons the work
async fn race_with_timeout<T, F>(limit: Duration, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> Option<T> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            debug!(error = %join_err, "Metadata parse task failed");
            None
        }
        Err(_) => {
            debug!(timeout_ms = limit.as_millis() as u64, "Metadata extraction timed out");
            None
        }
    }
}

fn parse_exif(bytes: &[u8], file_name: &str) -> Option<ExtractedMetadata> {
    let mut cursor = std::io::Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(file_name, error = %e, "EXIF parse failed");
            return None;
        }
    };

    // Coordinates count only when both components resolve
    let latitude = gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S');
    let longitude = gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W');
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    // Capture timestamp is independent of coordinates
    let captured_at = datetime_field(&exif, Tag::DateTimeOriginal)
        .or_else(|| datetime_field(&exif, Tag::DateTime));

    let metadata = ExtractedMetadata {
        coordinates,
        captured_at,
    };
    if metadata.is_empty() {
        None
    } else {
        Some(metadata)
    }
}

/// Degrees/minutes/seconds rationals to signed decimal degrees
fn gps_coordinate(
    exif: &exif::Exif,
    value_tag: Tag,
    ref_tag: Tag,
    negative_ref: u8,
) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let dms = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => parts,
        _ => return None,
    };

    let degrees = dms[0].to_f64() + dms[1].to_f64() / 60.0 + dms[2].to_f64() / 3600.0;
    if !degrees.is_finite() {
        return None;
    }

    let sign = match exif.get_field(ref_tag, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Ascii(refs)) if refs.first().and_then(|r| r.first()) == Some(&negative_ref) => {
            -1.0
        }
        _ => 1.0,
    };
    Some(sign * degrees)
}

fn datetime_field(exif: &exif::Exif, tag: Tag) -> Option<chrono::DateTime<Utc>> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let raw = match &field.value {
        Value::Ascii(values) => String::from_utf8_lossy(values.first()?).into_owned(),
        _ => return None,
    };
    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
