//! Media ingestion queue
//!
//! Validates each selected file, registers it as a tracked item, drives
//! preprocessing, and runs the per-item upload pipeline in the background.
//! Items are registered `Pending` with a local preview before upload
//! begins so the UI reflects selection instantly; their individual
//! pipelines are independent and may complete out of order, so every
//! update is keyed by the item's stable id.
//!
//! The queue is the only writer of tracked-item state. Consumers read
//! [`MediaView`] snapshots and subscribe to the event bus.

use crate::client::{LocationService, MediaUploadService};
use crate::extractor::MetadataExtractor;
use crate::models::{
    DraftMediaRef, ExtractedMetadata, MediaKind, MediaView, SelectedFile, TrackedMedia,
    UploadStatus,
};
use crate::preprocess::ImagePreprocessor;
use crate::preview::PreviewRegistry;
use bytes::Bytes;
use chronicle_common::events::CaptureEvent;
use chronicle_common::{time, CaptureConfig, EventBus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Default)]
struct MediaTable {
    items: HashMap<Uuid, TrackedMedia>,
    /// Selection order, for display and cover choice
    order: Vec<Uuid>,
}

/// Background ingestion queue for selected media files
///
/// Cloning is cheap; all clones share the same state, the same preview
/// registry, and the same session cancellation token.
#[derive(Clone)]
pub struct MediaIngestionQueue {
    table: Arc<RwLock<MediaTable>>,
    events: EventBus,
    config: Arc<CaptureConfig>,
    uploader: Arc<dyn MediaUploadService>,
    locations: Arc<dyn LocationService>,
    extractor: MetadataExtractor,
    preprocessor: ImagePreprocessor,
    previews: PreviewRegistry,
    cancel: Arc<StdMutex<CancellationToken>>,
}

impl MediaIngestionQueue {
    pub fn new(
        config: Arc<CaptureConfig>,
        events: EventBus,
        uploader: Arc<dyn MediaUploadService>,
        locations: Arc<dyn LocationService>,
    ) -> Self {
        Self {
            table: Arc::new(RwLock::new(MediaTable::default())),
            events,
            extractor: MetadataExtractor::new(&config),
            preprocessor: ImagePreprocessor::new(&config),
            config,
            uploader,
            locations,
            previews: PreviewRegistry::new(),
            cancel: Arc::new(StdMutex::new(CancellationToken::new())),
        }
    }

    /// Ingest a selection of files, in selection order
    ///
    /// Each file is validated independently; one rejected file never
    /// blocks the rest. Accepted files are registered immediately and
    /// their uploads proceed in the background.
    pub async fn ingest(&self, files: Vec<SelectedFile>) {
        for file in files {
            self.ingest_one(file).await;
        }
    }

    async fn ingest_one(&self, file: SelectedFile) {
        let Some(kind) = file.kind() else {
            warn!(file_name = %file.name, mime = %file.mime, "Rejecting unsupported file type");
            self.reject(&file.name, "Only images and videos can be added");
            return;
        };

        let ceiling = self.config.size_ceiling(kind);
        if file.bytes.len() as u64 > ceiling {
            warn!(
                file_name = %file.name,
                size = file.bytes.len(),
                ceiling,
                "Rejecting oversized file"
            );
            self.reject(&file.name, "File is too large");
            return;
        }

        // Preview before upload: the item must paint instantly
        let (preview_bytes, upload_artifact) = match kind {
            MediaKind::Image => {
                match self.preprocessor.preprocess(file.bytes.clone(), &file.name).await {
                    Ok(prepped) => (prepped.preview_bytes, prepped.upload_artifact),
                    Err(e) => {
                        warn!(file_name = %file.name, error = %e, "Preprocessing failed");
                        self.reject(&file.name, "File could not be read");
                        return;
                    }
                }
            }
            // Videos are not rasterized client-side; originals pass through
            MediaKind::Video => match self.preprocessor.placeholder_preview() {
                Ok(placeholder) => (placeholder, file.bytes.clone()),
                Err(e) => {
                    warn!(file_name = %file.name, error = %e, "Preprocessing failed");
                    self.reject(&file.name, "File could not be read");
                    return;
                }
            },
        };

        let id = Uuid::new_v4();
        let item = TrackedMedia {
            id,
            kind,
            status: UploadStatus::Pending,
            file_name: file.name.clone(),
            original_size: file.bytes.len() as u64,
            preview: self.previews.register(preview_bytes),
            remote_url: None,
            metadata: None,
            place_name: None,
        };

        {
            let mut table = self.table.write().await;
            table.items.insert(id, item);
            table.order.push(id);
        }

        debug!(item_id = %id, kind = %kind, file_name = %file.name, "Media registered");
        self.events.emit(CaptureEvent::MediaRegistered {
            item_id: id,
            kind,
            file_name: file.name.clone(),
            timestamp: time::now(),
        });

        let queue = self.clone();
        let cancel = self.session_token();
        tokio::spawn(async move {
            queue
                .run_item_pipeline(id, kind, file.name, file.bytes, upload_artifact, cancel)
                .await;
        });
    }

    /// Per-item pipeline: upload and metadata extraction race
    /// independently; reverse geocoding runs as an explicit continuation
    /// once both have settled.
    async fn run_item_pipeline(
        &self,
        id: Uuid,
        kind: MediaKind,
        file_name: String,
        original: Bytes,
        upload_artifact: Bytes,
        cancel: CancellationToken,
    ) {
        if !self.set_status(id, UploadStatus::Uploading).await {
            return;
        }

        let upload_fut = async {
            match kind {
                MediaKind::Image => self.uploader.upload_image(&file_name, upload_artifact).await,
                MediaKind::Video => self.uploader.upload_video(&file_name, upload_artifact).await,
            }
        };
        let metadata_fut = async {
            match kind {
                MediaKind::Image => self.extractor.extract(original, &file_name).await,
                MediaKind::Video => None,
            }
        };

        let joined = async { tokio::join!(upload_fut, metadata_fut) };
        let (upload_result, metadata) = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(item_id = %id, "Session closed; abandoning item pipeline");
                return;
            }
            result = joined => result,
        };

        // Metadata is keyed by item id: the remote URL may not exist yet
        if let Some(metadata) = metadata {
            self.attach_metadata(id, metadata).await;
        }

        match upload_result {
            Ok(uploaded) => {
                // The item may have been removed while the upload was in
                // flight; a completed upload must not write into that
                // now-gone state
                if !self.mark_ready(id, uploaded.url).await {
                    debug!(item_id = %id, "Upload completed for a removed item; dropping result");
                    return;
                }

                // Deterministic join: geocode only after both upload and
                // metadata have settled and coordinates exist
                if let Some(coords) = metadata.and_then(|m| m.coordinates) {
                    match self
                        .locations
                        .reverse_geocode(coords.latitude, coords.longitude)
                        .await
                    {
                        Ok(Some(place_name)) => self.attach_place(id, place_name).await,
                        Ok(None) => {}
                        Err(e) => {
                            // Best-effort enrichment; never surfaced
                            debug!(item_id = %id, error = %e, "Reverse geocode miss");
                        }
                    }
                }
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Upload failed; removing item");
                self.events.emit(CaptureEvent::MediaUploadFailed {
                    item_id: id,
                    reason: e.to_string(),
                    timestamp: time::now(),
                });
                // Failed uploads are not retried and not retained as
                // failed placeholders
                self.remove(id).await;
            }
        }
    }

    /// Remove an item, releasing its preview resource and any metadata or
    /// place-name state keyed by it
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = {
            let mut table = self.table.write().await;
            table.order.retain(|other| *other != id);
            table.items.remove(&id)
        };
        match removed {
            Some(item) => {
                // Dropping the item releases the preview handle
                drop(item);
                self.events.emit(CaptureEvent::MediaRemoved {
                    item_id: id,
                    timestamp: time::now(),
                });
                true
            }
            None => false,
        }
    }

    /// Tear down the session: cancel in-flight pipelines, drop all items,
    /// release every preview resource
    pub async fn reset(&self) {
        {
            let mut token = self.cancel.lock().expect("cancel token lock poisoned");
            token.cancel();
            *token = CancellationToken::new();
        }
        let drained = {
            let mut table = self.table.write().await;
            table.order.clear();
            table.items.drain().count()
        };
        info!(items = drained, "Ingestion queue reset");
    }

    /// Re-register already-uploaded media from a restored draft
    ///
    /// Restored items are `Ready` immediately; previews are placeholders
    /// since local rasters do not survive sessions.
    pub async fn restore_uploaded(&self, refs: &[DraftMediaRef]) {
        for media_ref in refs {
            let Ok(placeholder) = self.preprocessor.placeholder_preview() else {
                continue;
            };
            let id = Uuid::new_v4();
            let file_name = media_ref
                .url
                .rsplit('/')
                .next()
                .unwrap_or("restored")
                .to_string();
            let item = TrackedMedia {
                id,
                kind: media_ref.kind,
                status: UploadStatus::Ready,
                file_name: file_name.clone(),
                original_size: 0,
                preview: self.previews.register(placeholder),
                remote_url: Some(media_ref.url.clone()),
                metadata: None,
                place_name: None,
            };
            {
                let mut table = self.table.write().await;
                table.items.insert(id, item);
                table.order.push(id);
            }
            self.events.emit(CaptureEvent::MediaRegistered {
                item_id: id,
                kind: media_ref.kind,
                file_name,
                timestamp: time::now(),
            });
            self.events.emit(CaptureEvent::MediaUploadCompleted {
                item_id: id,
                url: media_ref.url.clone(),
                timestamp: time::now(),
            });
        }
    }

    /// Snapshots of all items, in selection order
    pub async fn views(&self) -> Vec<MediaView> {
        let table = self.table.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.items.get(id))
            .map(TrackedMedia::view)
            .collect()
    }

    /// Snapshots of items whose upload has completed
    pub async fn ready_views(&self) -> Vec<MediaView> {
        self.views()
            .await
            .into_iter()
            .filter(MediaView::is_ready)
            .collect()
    }

    /// True while any item has not finished uploading
    pub async fn has_uploads_in_flight(&self) -> bool {
        let table = self.table.read().await;
        table
            .items
            .values()
            .any(|item| matches!(item.status, UploadStatus::Pending | UploadStatus::Uploading))
    }

    pub async fn item_count(&self) -> usize {
        self.table.read().await.items.len()
    }

    /// Preview registry shared by this queue (teardown verification)
    pub fn preview_registry(&self) -> &PreviewRegistry {
        &self.previews
    }

    fn session_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .expect("cancel token lock poisoned")
            .clone()
    }

    fn reject(&self, file_name: &str, reason: &str) {
        self.events.emit(CaptureEvent::MediaRejected {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
            timestamp: time::now(),
        });
    }

    async fn set_status(&self, id: Uuid, new_status: UploadStatus) -> bool {
        let mut table = self.table.write().await;
        let Some(item) = table.items.get_mut(&id) else {
            return false;
        };
        let old_status = item.status;
        item.status = new_status;
        drop(table);
        self.events.emit(CaptureEvent::MediaStatusChanged {
            item_id: id,
            old_status,
            new_status,
            timestamp: time::now(),
        });
        true
    }

    async fn mark_ready(&self, id: Uuid, url: String) -> bool {
        let old_status = {
            let mut table = self.table.write().await;
            let Some(item) = table.items.get_mut(&id) else {
                return false;
            };
            let old_status = item.status;
            item.status = UploadStatus::Ready;
            item.remote_url = Some(url.clone());
            old_status
        };
        self.events.emit(CaptureEvent::MediaStatusChanged {
            item_id: id,
            old_status,
            new_status: UploadStatus::Ready,
            timestamp: time::now(),
        });
        self.events.emit(CaptureEvent::MediaUploadCompleted {
            item_id: id,
            url,
            timestamp: time::now(),
        });
        true
    }

    async fn attach_metadata(&self, id: Uuid, metadata: ExtractedMetadata) {
        {
            let mut table = self.table.write().await;
            let Some(item) = table.items.get_mut(&id) else {
                return;
            };
            item.metadata = Some(metadata);
        }
        self.events.emit(CaptureEvent::MetadataExtracted {
            item_id: id,
            latitude: metadata.coordinates.map(|c| c.latitude),
            longitude: metadata.coordinates.map(|c| c.longitude),
            captured_at: metadata.captured_at,
            timestamp: time::now(),
        });
    }

    async fn attach_place(&self, id: Uuid, place_name: String) {
        {
            let mut table = self.table.write().await;
            let Some(item) = table.items.get_mut(&id) else {
                return;
            };
            item.place_name = Some(place_name.clone());
        }
        self.events.emit(CaptureEvent::PlaceResolved {
            item_id: id,
            place_name,
            timestamp: time::now(),
        });
    }
}
