//! Draft persistence
//!
//! One JSON record at a fixed path. Saving overwrites, never accumulates
//! history; loading discards corrupt or expired records rather than
//! surfacing them.

use crate::error::CaptureResult;
use crate::models::DraftSnapshot;
use chronicle_common::{time, CaptureConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Single-record draft store backed by a JSON file
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
    ttl: chrono::Duration,
}

impl DraftStore {
    pub fn new(path: PathBuf, ttl_days: i64) -> Self {
        Self {
            path,
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.resolve_draft_path(), config.draft_ttl_days)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Persist a snapshot, replacing any prior record
    pub async fn save(&self, snapshot: &DraftSnapshot) -> CaptureResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(chronicle_common::Error::Io)?;
        }
        let json =
            serde_json::to_vec_pretty(snapshot).map_err(chronicle_common::Error::Serialization)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(chronicle_common::Error::Io)?;
        info!(path = ?self.path, "Draft saved");
        Ok(())
    }

    /// Load the current record, if one exists and is still fresh
    ///
    /// A corrupt or expired record is removed and reported as absent; a
    /// stale draft restored weeks later would be worse than none.
    pub async fn load(&self) -> CaptureResult<Option<DraftSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(chronicle_common::Error::Io(e).into()),
        };

        let snapshot: DraftSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Discarding unreadable draft");
                self.clear().await?;
                return Ok(None);
            }
        };

        if snapshot.age(time::now()) > self.ttl {
            debug!(saved_at = %snapshot.saved_at, "Discarding expired draft");
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(snapshot))
    }

    /// Remove the record; absent is success
    pub async fn clear(&self) -> CaptureResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(chronicle_common::Error::Io(e).into()),
        }
    }
}
