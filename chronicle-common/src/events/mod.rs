//! Event types for the Chronicle capture pipeline
//!
//! Provides shared event definitions and the EventBus used by every
//! pipeline component. The UI layer subscribes once and keys all per-item
//! updates by the item's stable id, never by list position.

// Sub-modules (supporting types)
mod media_types;
mod session_types;

pub use media_types::{MediaKind, UploadStatus};
pub use session_types::{LocationHit, RecordingState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Chronicle capture pipeline events
///
/// Events are broadcast via EventBus; all variants carry the stable ids
/// consumers need to apply the update without positional lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CaptureEvent {
    /// A selected file passed validation and is now tracked
    ///
    /// Emitted before upload begins so the UI reflects selection instantly.
    MediaRegistered {
        /// Stable item id assigned at ingestion time
        item_id: Uuid,
        /// Image or video
        kind: MediaKind,
        /// Original file name, for display
        file_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A selected file was rejected during validation
    ///
    /// One rejected file never blocks the rest of the selection.
    MediaRejected {
        file_name: String,
        /// User-visible rejection reason
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item upload status changed
    MediaStatusChanged {
        item_id: Uuid,
        old_status: UploadStatus,
        new_status: UploadStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item upload completed and the remote URL is known
    MediaUploadCompleted {
        item_id: Uuid,
        url: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item upload failed; the item has been removed from the queue
    MediaUploadFailed {
        item_id: Uuid,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item removed (user action or failed upload)
    MediaRemoved {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Best-effort metadata extraction attached coordinates/capture time
    ///
    /// Coordinates are present only when both latitude and longitude were
    /// valid in the source tags; capture time is independent of them.
    MetadataExtracted {
        item_id: Uuid,
        latitude: Option<f64>,
        longitude: Option<f64>,
        captured_at: Option<chrono::DateTime<chrono::Utc>>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Best-effort reverse geocode resolved a place name for an item
    PlaceResolved {
        item_id: Uuid,
        place_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Voice capture state changed (Idle / Recording / Transcribing)
    RecordingStateChanged {
        old_state: RecordingState,
        new_state: RecordingState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Emitted once per second while recording
    RecordingTick {
        elapsed_seconds: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transcription of the recorded audio finished
    TranscriptReady {
        text: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Debounced location search published results
    ///
    /// Only the most recent query's response is ever published; stale
    /// responses are dropped by the search component.
    LocationResults {
        query: String,
        results: Vec<LocationHit>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// AI story generation finished and a result is available
    GenerationCompleted {
        suggested_title: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Draft snapshot written to local storage
    DraftSaved {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A previously saved draft was restored into the form
    DraftRestored {
        saved_at: chrono::DateTime<chrono::Utc>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Event published successfully
    PublishCompleted {
        event_id: Uuid,
        slug: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Capture session reset (close/discard); all local resources released
    SessionReset {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A user-initiated action failed with a dismissible, user-visible message
    ///
    /// Used for failures that happen off the caller's await path (voice
    /// finalization, background search). Best-effort lookups never emit this.
    ActionFailed {
        /// Short action identifier (e.g. "transcription", "location_search")
        action: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast event bus for capture pipeline events
///
/// Thin wrapper over `tokio::sync::broadcast`. Emitting never blocks; if no
/// subscriber is listening the event is dropped, which is fine for UI
/// progress updates.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CaptureEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers
    ///
    /// Returns the number of subscribers that received the event.
    pub fn emit(&self, event: CaptureEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                // No active subscribers; drop silently
                0
            }
        }
    }

    /// Channel capacity this bus was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
