//! Two-pass image preprocessing
//!
//! Produces a small instant preview raster and a larger bandwidth-reduced
//! upload raster from an original image. The preview pass favors latency
//! (it blocks the first paint of the item); the upload pass favors
//! fidelity. Formats the raster pipeline cannot decode short-circuit to a
//! placeholder preview with the original file passed through unresized
//! (server-side conversion is assumed).

use crate::error::{CaptureError, CaptureResult};
use bytes::Bytes;
use chronicle_common::CaptureConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Longer side of the fixed placeholder preview raster
pub const PLACEHOLDER_DIMENSION: u32 = 96;

/// Camera container formats the raster pipeline cannot decode
const UNDECODABLE_EXTENSIONS: &[&str] = &["heic", "heif", "hif"];

/// Result of preprocessing one original image
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    /// Small raster for instant display
    pub preview_bytes: Bytes,
    /// What actually gets uploaded: resized re-encode, or the original
    /// when the format could not be decoded
    pub upload_artifact: Bytes,
    pub original_size: u64,
    pub upload_size: u64,
}

impl PreprocessedImage {
    /// Bandwidth saved by the upload re-encode; observability only, never
    /// control flow
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        1.0 - (self.upload_size as f64 / self.original_size as f64)
    }
}

/// Two-pass raster preprocessor
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    preview_max: u32,
    upload_max: u32,
    preview_quality: u8,
    upload_quality: u8,
}

impl ImagePreprocessor {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            preview_max: config.preview_max_dimension,
            upload_max: config.upload_max_dimension,
            preview_quality: config.preview_jpeg_quality,
            upload_quality: config.upload_jpeg_quality,
        }
    }

    /// Preprocess one original image
    pub async fn preprocess(&self, bytes: Bytes, file_name: &str) -> CaptureResult<PreprocessedImage> {
        let this = *self;
        let name = file_name.to_string();
        let result = tokio::task::spawn_blocking(move || this.preprocess_blocking(bytes, &name))
            .await
            .map_err(|e| {
                CaptureError::Common(chronicle_common::Error::Internal(format!(
                    "Preprocess task failed: {}",
                    e
                )))
            })??;

        debug!(
            file_name,
            original_size = result.original_size,
            upload_size = result.upload_size,
            reduction_ratio = result.reduction_ratio(),
            "Image preprocessed"
        );
        Ok(result)
    }

    /// Fixed-size placeholder raster for undecodable formats and videos
    pub fn placeholder_preview(&self) -> CaptureResult<Bytes> {
        let gray = image::RgbImage::from_pixel(
            PLACEHOLDER_DIMENSION,
            PLACEHOLDER_DIMENSION,
            image::Rgb([0xC8, 0xC8, 0xC8]),
        );
        encode_jpeg(&DynamicImage::ImageRgb8(gray), self.preview_quality)
    }

    fn preprocess_blocking(&self, bytes: Bytes, file_name: &str) -> CaptureResult<PreprocessedImage> {
        let original_size = bytes.len() as u64;

        if has_undecodable_extension(file_name) {
            debug!(file_name, "Undecodable container format; passing original through");
            return self.passthrough(bytes);
        }

        let decoded = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                debug!(file_name, error = %e, "Raster decode failed; passing original through");
                return self.passthrough(bytes);
            }
        };

        // Respect embedded orientation before any resize
        let upright = apply_orientation(decoded, exif_orientation(&bytes));

        // Two independent raster passes from the same decode: the preview
        // must be near-instant, the upload raster keeps fidelity
        let preview = scale_down(&upright, self.preview_max, FilterType::Triangle);
        let preview_bytes = encode_jpeg(&preview, self.preview_quality)?;

        let upload = scale_down(&upright, self.upload_max, FilterType::Lanczos3);
        let upload_artifact = encode_jpeg(&upload, self.upload_quality)?;
        let upload_size = upload_artifact.len() as u64;

        Ok(PreprocessedImage {
            preview_bytes,
            upload_artifact,
            original_size,
            upload_size,
        })
    }

    fn passthrough(&self, original: Bytes) -> CaptureResult<PreprocessedImage> {
        let original_size = original.len() as u64;
        Ok(PreprocessedImage {
            preview_bytes: self.placeholder_preview()?,
            upload_artifact: original,
            original_size,
            upload_size: original_size,
        })
    }
}

fn has_undecodable_extension(file_name: &str) -> bool {
    file_name
        .rsplit('.')
        .next()
        .map(|ext| {
            UNDECODABLE_EXTENSIONS
                .iter()
                .any(|u| ext.eq_ignore_ascii_case(u))
        })
        .unwrap_or(false)
}

/// Uniform scale factor `min(1, target_max / longer_side)`; never upscales
fn scaled_dimensions(width: u32, height: u32, target_max: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= target_max {
        return (width, height);
    }
    let factor = target_max as f64 / longer as f64;
    let w = ((width as f64 * factor).round() as u32).max(1);
    let h = ((height as f64 * factor).round() as u32).max(1);
    (w, h)
}

fn scale_down(img: &DynamicImage, target_max: u32, filter: FilterType) -> DynamicImage {
    let (w, h) = scaled_dimensions(img.width(), img.height(), target_max);
    if (w, h) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(w, h, filter)
    }
}

/// EXIF orientation tag value (1-8), if present
fn exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = std::io::Cursor::new(bytes);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> CaptureResult<Bytes> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder).map_err(|e| {
        CaptureError::Common(chronicle_common::Error::Internal(format!(
            "JPEG encode failed: {}",
            e
        )))
    })?;
    Ok(Bytes::from(out))
}
