//! Test fixtures: configs, files, and logging

use bytes::Bytes;
use chronicle_capture::models::SelectedFile;
use chronicle_common::CaptureConfig;
use std::path::Path;

/// Initialize tracing for test output; safe to call repeatedly
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Config with the draft record rooted in a test directory
pub fn test_config(draft_dir: &Path) -> CaptureConfig {
    CaptureConfig {
        draft_path: Some(draft_dir.join("draft.json")),
        ..CaptureConfig::default()
    }
}

/// Encode a small solid-color PNG
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    Bytes::from(out.into_inner())
}

/// A decodable selected image file
pub fn png_file(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        mime: "image/png".to_string(),
        bytes: png_bytes(64, 48),
    }
}

/// A selected file with arbitrary content
pub fn selected_file(name: &str, mime: &str, bytes: Bytes) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        mime: mime.to_string(),
        bytes,
    }
}

/// A TIFF whose EXIF tags place the shot at 48°51'N 2°21'E (48.85, 2.35)
/// with a capture time
pub fn gps_tagged_tiff() -> Bytes {
    use exif::experimental::Writer;
    use exif::{Field, In, Rational, Tag, Value};

    let dms = |degrees: u32, minutes: u32| {
        Value::Rational(vec![
            Rational { num: degrees, denom: 1 },
            Rational { num: minutes, denom: 1 },
            Rational { num: 0, denom: 1 },
        ])
    };
    let fields = [
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms(48, 51),
        },
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"N".to_vec()]),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms(2, 21),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"E".to_vec()]),
        },
        Field {
            tag: Tag::DateTimeOriginal,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"2024:06:01 12:30:00".to_vec()]),
        },
    ];

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut out = std::io::Cursor::new(Vec::new());
    writer.write(&mut out, false).expect("exif encode");
    Bytes::from(out.into_inner())
}
