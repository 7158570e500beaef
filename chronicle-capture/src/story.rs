//! Story generation orchestration
//!
//! Merges per-photo enrichment (coordinates, place name, capture time)
//! with free-text input, invokes the generation collaborator, and exposes
//! the selectable description variants.

use crate::client::StoryService;
use crate::error::{CaptureError, CaptureResult};
use crate::models::{EntryForm, GenerationResult, LocationHit, MediaView, PhotoDescriptor};
use chronicle_common::events::CaptureEvent;
use chronicle_common::{time, EventBus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Which description the user has selected post-generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionVariant {
    /// The verbatim free text the user supplied
    Original,
    /// The generated enhanced markup
    Enhanced,
    /// A user-editable copy, seeded from the enhanced markup on first
    /// selection
    Custom,
}

/// Orchestrates generation calls and variant selection
pub struct StoryGenerationOrchestrator {
    service: Arc<dyn StoryService>,
    events: EventBus,
    result: Option<GenerationResult>,
    variant: DescriptionVariant,
    custom_text: Option<String>,
    /// First photo coordinates seen at generation time; anchors a
    /// suggested location name to a real point
    anchor_coordinates: Option<(f64, f64)>,
}

impl StoryGenerationOrchestrator {
    pub fn new(events: EventBus, service: Arc<dyn StoryService>) -> Self {
        Self {
            service,
            events,
            result: None,
            variant: DescriptionVariant::Enhanced,
            custom_text: None,
            anchor_coordinates: None,
        }
    }

    /// Generate a story from ready photos and free text
    ///
    /// Fails with `InsufficientInput` when there is neither a ready image
    /// nor non-blank free text. A successful call replaces any prior
    /// result wholesale and resets the variant selection to Enhanced.
    pub async fn generate(
        &mut self,
        media: &[MediaView],
        free_text: &str,
    ) -> CaptureResult<&GenerationResult> {
        let descriptors: Vec<PhotoDescriptor> = media
            .iter()
            .filter(|view| view.is_ready_image())
            .filter_map(photo_descriptor)
            .collect();

        if descriptors.is_empty() && free_text.trim().is_empty() {
            return Err(CaptureError::InsufficientInput);
        }

        info!(
            photos = descriptors.len(),
            has_text = !free_text.trim().is_empty(),
            "Requesting story generation"
        );
        let result = self.service.generate_story(&descriptors, free_text).await?;

        self.events.emit(CaptureEvent::GenerationCompleted {
            suggested_title: result.suggested_title.clone(),
            timestamp: time::now(),
        });

        self.anchor_coordinates = descriptors
            .iter()
            .find_map(|d| d.latitude.zip(d.longitude));
        self.variant = DescriptionVariant::Enhanced;
        self.custom_text = None;
        Ok(self.result.insert(result))
    }

    /// Fill only currently-empty form fields from the suggestions
    ///
    /// A user's manual edits are never overwritten by a later
    /// regeneration.
    pub fn apply_suggestions(&self, form: &mut EntryForm) {
        let Some(result) = &self.result else {
            return;
        };

        if form.title.trim().is_empty() {
            if let Some(title) = &result.suggested_title {
                debug!(title = %title, "Auto-filling title from generation");
                form.title = title.clone();
            }
        }
        if form.category.trim().is_empty() {
            if let Some(category) = &result.suggested_category {
                form.category = category.clone();
            }
        }
        if form.location.is_none() {
            if let (Some(name), Some((latitude, longitude))) =
                (&result.suggested_location_name, self.anchor_coordinates)
            {
                form.location = Some(LocationHit {
                    name: name.clone(),
                    latitude,
                    longitude,
                    kind: None,
                    address: None,
                });
            }
        }
    }

    /// Select a description variant
    ///
    /// First selection of Custom seeds the editable copy from the
    /// enhanced markup.
    pub fn select_variant(&mut self, variant: DescriptionVariant) {
        if variant == DescriptionVariant::Custom && self.custom_text.is_none() {
            self.custom_text = self.result.as_ref().map(|r| r.enhanced_html.clone());
        }
        self.variant = variant;
    }

    /// Replace the user-editable custom copy
    pub fn set_custom_text(&mut self, text: String) {
        self.custom_text = Some(text);
        self.variant = DescriptionVariant::Custom;
    }

    pub fn variant(&self) -> DescriptionVariant {
        self.variant
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    /// The currently selected description text, if a result exists
    pub fn selected_description(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        match self.variant {
            DescriptionVariant::Original => Some(result.original_text.clone()),
            DescriptionVariant::Enhanced => Some(result.enhanced_html.clone()),
            DescriptionVariant::Custom => self
                .custom_text
                .clone()
                .or_else(|| Some(result.enhanced_html.clone())),
        }
    }

    /// Drop the result and variant state (session teardown)
    pub fn reset(&mut self) {
        self.result = None;
        self.variant = DescriptionVariant::Enhanced;
        self.custom_text = None;
        self.anchor_coordinates = None;
    }
}

fn photo_descriptor(view: &MediaView) -> Option<PhotoDescriptor> {
    let url = view.remote_url.clone()?;
    let coordinates = view.metadata.and_then(|m| m.coordinates);
    Some(PhotoDescriptor {
        url,
        latitude: coordinates.map(|c| c.latitude),
        longitude: coordinates.map(|c| c.longitude),
        place_name: view.place_name.clone(),
        captured_at: view.metadata.and_then(|m| m.captured_at),
    })
}
