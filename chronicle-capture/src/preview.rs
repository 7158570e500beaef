//! Scoped local preview resources
//!
//! Preview rasters are the in-process analog of object URLs: cheap local
//! handles the UI can paint immediately, invalid across sessions, and
//! required to be released on item removal and on whole-session teardown
//! in every exit path. The registry tracks live handles so teardown (and
//! tests) can verify nothing leaked.

use bytes::Bytes;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::trace;
use uuid::Uuid;

/// Registry of live preview handles
///
/// Cloning is cheap; all clones share the same live set.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register preview bytes and hand out a scoped handle
    pub fn register(&self, data: Bytes) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live
            .lock()
            .expect("preview registry lock poisoned")
            .insert(id);
        trace!(preview_id = %id, bytes = data.len(), "Preview registered");
        PreviewHandle {
            id,
            data,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().expect("preview registry lock poisoned").len()
    }
}

/// A registered preview raster
///
/// Released on `release()` or on drop, whichever comes first. Deliberately
/// not `Clone`: exactly one owner (the tracked item) controls the lifetime.
pub struct PreviewHandle {
    id: Uuid,
    data: Bytes,
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewHandle {
    /// Stable identity of this preview, used to key metadata extraction
    /// before a remote URL exists
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Raw preview bytes for display
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Explicitly release the preview resource
    pub fn release(self) {
        // Drop does the work
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.id);
        }
        trace!(preview_id = %self.id, "Preview released");
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_release() {
        let registry = PreviewRegistry::new();
        let handle = registry.register(Bytes::from_static(b"raster"));
        assert_eq!(registry.live_count(), 1);

        handle.release();
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_drop_releases() {
        let registry = PreviewRegistry::new();
        {
            let _a = registry.register(Bytes::from_static(b"a"));
            let _b = registry.register(Bytes::from_static(b"b"));
            assert_eq!(registry.live_count(), 2);
        }
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_handles_have_distinct_ids() {
        let registry = PreviewRegistry::new();
        let a = registry.register(Bytes::from_static(b"a"));
        let b = registry.register(Bytes::from_static(b"a"));
        assert_ne!(a.id(), b.id());
    }
}
