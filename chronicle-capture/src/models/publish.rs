//! Publish payload assembly types

use crate::models::LocationHit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[default]
    Private,
    Unlisted,
    Public,
}

/// The assembled outbound event entity
///
/// Constructed only at publish time; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishPayload {
    pub title: String,
    /// Final description markup (narrative and/or media markup)
    pub description_html: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Cover reference: first ready image's remote URL
    pub cover_url: Option<String>,
    pub privacy: PrivacyLevel,
    pub category: Option<String>,
    pub location: Option<LocationHit>,
    pub multi_location: bool,
}

/// The server's record of a created event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: Uuid,
    pub slug: String,
}
