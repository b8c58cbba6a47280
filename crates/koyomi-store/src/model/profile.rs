use serde::{Deserialize, Serialize};

use super::participant::Participant;

/// Per-user profile document from the identity provider, extended with the
/// user's event interaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Event ids this user has interacted with, most recent first.
    #[serde(default)]
    pub event_history: Vec<String>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: None,
            photo_url: None,
            event_history: Vec::new(),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {last_name}", self.first_name),
            None => self.first_name.clone(),
        }
    }

    /// Derives the participant shape embedded in event documents.
    #[must_use]
    pub fn to_participant(&self) -> Participant {
        Participant {
            id: self.id.clone(),
            name: self.display_name(),
            photo_url: self.photo_url.clone(),
        }
    }

    /// Moves the event id to the front of the history, deduplicating any
    /// prior occurrence.
    pub fn record_event(&mut self, event_id: &str) {
        self.event_history.retain(|id| id != event_id);
        self.event_history.insert(0, event_id.to_string());
    }
}
