//! The quick-publish entry form

use crate::models::{LocationHit, PrivacyLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Controlled form state owned by the publish session
///
/// Plain data; all coordination lives in the session. Suggestion
/// application only ever fills fields that are empty here, so manual edits
/// survive regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub title: String,
    pub narrative_text: String,
    /// Raw dictation transcript, merged from voice capture
    pub dictation_text: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<LocationHit>,
    /// Empty string means "not chosen"
    pub category: String,
    pub privacy: PrivacyLevel,
    pub multi_location: bool,
}

impl EntryForm {
    /// New form dated today
    pub fn new_for_today() -> Self {
        Self {
            title: String::new(),
            narrative_text: String::new(),
            dictation_text: String::new(),
            date: chrono::Utc::now().date_naive(),
            end_date: None,
            location: None,
            category: String::new(),
            privacy: PrivacyLevel::default(),
            multi_location: false,
        }
    }

    /// True when any text field holds user input
    pub fn has_text_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.narrative_text.trim().is_empty()
            || !self.dictation_text.trim().is_empty()
    }

    /// Free text fed to story generation: narrative first, dictation after
    pub fn free_text(&self) -> String {
        let narrative = self.narrative_text.trim();
        let dictation = self.dictation_text.trim();
        match (narrative.is_empty(), dictation.is_empty()) {
            (true, true) => String::new(),
            (false, true) => narrative.to_string(),
            (true, false) => dictation.to_string(),
            (false, false) => format!("{}\n{}", narrative, dictation),
        }
    }
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new_for_today()
    }
}
