//! Voice capture artifacts

use bytes::Bytes;

/// Finalized audio produced by a recording session
///
/// Cheap to clone (`Bytes` is reference-counted); the backing resource is
/// released when the last clone drops.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Bytes,
    /// Container MIME type ("audio/webm", "audio/wav", ...)
    pub mime: String,
    pub duration_seconds: f64,
}
