//! Quick-publish session
//!
//! Owns the form state and coordinates the pipeline components through a
//! single publish lifecycle: `Editing → Publishing → Published`, with
//! failed attempts rolling back to `Editing`. One session per capture
//! surface; closing it releases every session-scoped resource.

pub mod payload;

use crate::client::{
    AudioCaptureDevice, EventService, LocationService, MediaUploadService, StoryService,
    TranscriptionService,
};
use crate::draft::DraftStore;
use crate::error::{CaptureError, CaptureResult, ValidationIssue};
use crate::ingest::MediaIngestionQueue;
use crate::models::{CreatedEvent, DraftMediaRef, DraftSnapshot, EntryForm};
use crate::search::DebouncedLocationSearch;
use crate::story::StoryGenerationOrchestrator;
use crate::voice::VoiceCaptureSession;
use chronicle_common::events::CaptureEvent;
use chronicle_common::{time, CaptureConfig, EventBus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the description is composed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeMode {
    /// AI story generation drives the description
    Assisted,
    /// The user writes the description directly
    #[default]
    Manual,
}

/// Publish lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Publishing,
    Published,
}

/// What closing the session requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Nothing unsaved; close immediately
    Clean,
    /// Unsaved work exists; the caller must confirm discard or save a draft
    ConfirmDiscard,
}

/// Remote and hardware collaborators for one session
///
/// Bundled so construction sites name each seam once; production wires
/// every field to the same [`crate::client::http::HttpApiClient`] plus the
/// platform audio device.
#[derive(Clone)]
pub struct Collaborators {
    pub uploader: Arc<dyn MediaUploadService>,
    pub locations: Arc<dyn LocationService>,
    pub transcriber: Arc<dyn TranscriptionService>,
    pub stories: Arc<dyn StoryService>,
    pub publisher: Arc<dyn EventService>,
    pub audio: Arc<dyn AudioCaptureDevice>,
}

/// The quick-publish capture session
///
/// Single owner of the entry form; components communicate results through
/// the shared event bus and the session pulls their state when it needs a
/// coherent snapshot (validation, payload assembly).
pub struct QuickPublishSession {
    form: EntryForm,
    mode: ComposeMode,
    assisted_entitled: bool,
    state: SessionState,
    queue: MediaIngestionQueue,
    voice: VoiceCaptureSession,
    story: StoryGenerationOrchestrator,
    search: DebouncedLocationSearch,
    drafts: DraftStore,
    events: EventBus,
    publisher: Arc<dyn EventService>,
    draft_loaded: bool,
}

impl QuickPublishSession {
    pub fn new(config: CaptureConfig, collaborators: Collaborators) -> Self {
        let events = EventBus::new(config.event_bus_capacity);
        let drafts = DraftStore::from_config(&config);
        let config = Arc::new(config);
        Self {
            form: EntryForm::new_for_today(),
            mode: ComposeMode::default(),
            assisted_entitled: false,
            state: SessionState::Editing,
            queue: MediaIngestionQueue::new(
                config.clone(),
                events.clone(),
                collaborators.uploader,
                collaborators.locations.clone(),
            ),
            voice: VoiceCaptureSession::new(
                &config,
                events.clone(),
                collaborators.audio,
                collaborators.transcriber,
            ),
            story: StoryGenerationOrchestrator::new(events.clone(), collaborators.stories),
            search: DebouncedLocationSearch::new(&config, events.clone(), collaborators.locations),
            drafts,
            events,
            publisher: collaborators.publisher,
            draft_loaded: false,
        }
    }

    /// Open the session, restoring a saved draft at most once
    pub async fn open(&mut self) -> CaptureResult<()> {
        if self.draft_loaded {
            return Ok(());
        }
        self.draft_loaded = true;

        let Some(snapshot) = self.drafts.load().await? else {
            return Ok(());
        };
        info!(saved_at = %snapshot.saved_at, "Restoring saved draft");

        self.form.title = snapshot.title;
        self.form.narrative_text = snapshot.narrative_text;
        self.form.dictation_text = snapshot.dictation_text;
        self.form.date = snapshot.date;
        self.form.location = snapshot.location;
        self.form.category = snapshot.category;
        self.queue.restore_uploaded(&snapshot.media).await;

        self.events.emit(CaptureEvent::DraftRestored {
            saved_at: snapshot.saved_at,
            timestamp: time::now(),
        });
        Ok(())
    }

    /// Collect every violated publish precondition
    ///
    /// Accumulates all issues rather than failing on the first, so the
    /// user sees the complete list at once.
    pub async fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.queue.has_uploads_in_flight().await {
            issues.push(ValidationIssue::UploadsInFlight);
        }
        match self.mode {
            ComposeMode::Manual => {
                let has_image = self
                    .queue
                    .ready_views()
                    .await
                    .iter()
                    .any(|view| view.is_ready_image());
                if !has_image {
                    issues.push(ValidationIssue::ImageRequired);
                }
            }
            ComposeMode::Assisted => {
                if self.story.result().is_none() {
                    issues.push(ValidationIssue::GenerationRequired);
                }
            }
        }
        issues
    }

    /// Publish the entry
    ///
    /// Validation failure and collaborator errors both leave the session
    /// in `Editing` with all state intact; `QuotaExceeded` passes through
    /// untouched so callers can route to the upgrade path. Per-photo
    /// caption persistence after creation is best-effort and never fails
    /// the publish.
    pub async fn publish(&mut self) -> CaptureResult<CreatedEvent> {
        if self.state != SessionState::Editing {
            return Err(CaptureError::Common(chronicle_common::Error::InvalidInput(
                "publish already in progress".to_string(),
            )));
        }

        let issues = self.validate().await;
        if !issues.is_empty() {
            return Err(CaptureError::Validation(issues));
        }
        self.state = SessionState::Publishing;

        let media = self.queue.ready_views().await;
        let description = match self.mode {
            ComposeMode::Manual => payload::manual_description(&self.form.narrative_text, &media),
            ComposeMode::Assisted => {
                // Validation guarantees a result exists in assisted mode
                let selected = self.story.selected_description().unwrap_or_default();
                payload::assisted_description(self.story.variant(), &selected, &media)
            }
        };
        let payload = payload::assemble_payload(&self.form, description, &media);

        let created = match self.publisher.create_event(&payload, true).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Event creation failed");
                self.state = SessionState::Editing;
                return Err(e);
            }
        };

        if let Some(result) = self.story.result() {
            for (order, caption) in result.photo_captions.iter().enumerate() {
                if let Err(e) = self
                    .publisher
                    .create_event_image(created.id, &caption.media_url, &caption.caption, order)
                    .await
                {
                    warn!(event_id = %created.id, error = %e, "Caption persistence failed");
                }
            }
        }

        if let Err(e) = self.drafts.clear().await {
            warn!(error = %e, "Could not clear draft after publish");
        }

        self.state = SessionState::Published;
        info!(event_id = %created.id, slug = %created.slug, "Entry published");
        self.events.emit(CaptureEvent::PublishCompleted {
            event_id: created.id,
            slug: created.slug.clone(),
            timestamp: time::now(),
        });
        Ok(created)
    }

    /// Run story generation from the current form text and ready photos,
    /// then fill empty form fields from the suggestions
    pub async fn generate(&mut self) -> CaptureResult<()> {
        let media = self.queue.ready_views().await;
        let free_text = self.form.free_text();
        self.story.generate(&media, &free_text).await?;
        self.story.apply_suggestions(&mut self.form);
        Ok(())
    }

    /// Merge a finished transcript into the dictation text
    pub fn apply_transcript(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.form.dictation_text.trim().is_empty() {
            self.form.dictation_text = text.to_string();
        } else {
            self.form.dictation_text.push('\n');
            self.form.dictation_text.push_str(text);
        }
    }

    /// Switch compose mode; assisted requires entitlement
    pub fn set_mode(&mut self, mode: ComposeMode) -> CaptureResult<()> {
        if mode == ComposeMode::Assisted && !self.assisted_entitled {
            return Err(CaptureError::Common(chronicle_common::Error::InvalidInput(
                "assisted mode is not available on the current plan".to_string(),
            )));
        }
        debug!(?mode, "Compose mode changed");
        self.mode = mode;
        Ok(())
    }

    /// Record the caller's plan entitlement; revoking it drops back to
    /// manual mode
    pub fn set_assisted_entitled(&mut self, entitled: bool) {
        self.assisted_entitled = entitled;
        if !entitled && self.mode == ComposeMode::Assisted {
            self.mode = ComposeMode::Manual;
        }
    }

    /// Whether closing now would lose work
    pub async fn request_close(&self) -> CloseOutcome {
        if self.state == SessionState::Published {
            return CloseOutcome::Clean;
        }
        let unsaved = self.form.has_text_content()
            || self.queue.item_count().await > 0
            || self.story.result().is_some();
        if unsaved {
            CloseOutcome::ConfirmDiscard
        } else {
            CloseOutcome::Clean
        }
    }

    /// Discard all work, including any saved draft
    pub async fn discard(&mut self) -> CaptureResult<()> {
        self.drafts.clear().await?;
        self.reset_all().await;
        Ok(())
    }

    /// Snapshot the current work to the draft store, then tear down
    ///
    /// Only completed uploads enter the snapshot; in-flight items are
    /// dropped with the session.
    pub async fn save_draft(&mut self) -> CaptureResult<()> {
        let media: Vec<DraftMediaRef> = self
            .queue
            .ready_views()
            .await
            .into_iter()
            .filter_map(|view| {
                view.remote_url.map(|url| DraftMediaRef {
                    url,
                    kind: view.kind,
                })
            })
            .collect();

        let snapshot = DraftSnapshot {
            title: self.form.title.clone(),
            narrative_text: self.form.narrative_text.clone(),
            dictation_text: self.form.dictation_text.clone(),
            date: self.form.date,
            location: self.form.location.clone(),
            category: self.form.category.clone(),
            media,
            saved_at: time::now(),
        };
        self.drafts.save(&snapshot).await?;
        self.events.emit(CaptureEvent::DraftSaved {
            timestamp: time::now(),
        });
        self.reset_all().await;
        Ok(())
    }

    /// The session-owned event bus; subscribe here to observe the pipeline
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    pub fn mode(&self) -> ComposeMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn media(&self) -> &MediaIngestionQueue {
        &self.queue
    }

    pub fn voice(&self) -> &VoiceCaptureSession {
        &self.voice
    }

    pub fn story(&self) -> &StoryGenerationOrchestrator {
        &self.story
    }

    pub fn story_mut(&mut self) -> &mut StoryGenerationOrchestrator {
        &mut self.story
    }

    pub fn location_search(&self) -> &DebouncedLocationSearch {
        &self.search
    }

    pub fn draft_store(&self) -> &DraftStore {
        &self.drafts
    }

    async fn reset_all(&mut self) {
        self.queue.reset().await;
        self.voice.clear().await;
        self.story.reset();
        self.search.shutdown();
        self.form = EntryForm::new_for_today();
        self.state = SessionState::Editing;
        self.events.emit(CaptureEvent::SessionReset {
            timestamp: time::now(),
        });
    }
}
