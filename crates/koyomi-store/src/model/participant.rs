use serde::{Deserialize, Serialize};

use koyomi_slot::slot::SlotKey;

/// A person as embedded in an event document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier from the identity provider.
    pub id: String,
    /// Display name shown in the availability grid.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Participant {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo_url: None,
        }
    }
}

/// One respondent's answer: the slots they can attend.
///
/// A respondent with nothing selected is not represented at all; the
/// respondent count and notification threshold key off the record list
/// length, never off selection emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub participant: Participant,
    /// Deduplicated slot keys, all belonging to the event's offered set.
    pub selected: Vec<SlotKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl SelectionRecord {
    #[must_use]
    pub fn new(participant: Participant, selected: Vec<SlotKey>) -> Self {
        Self {
            participant,
            selected,
            comments: None,
        }
    }
}

/// A respondent who explicitly marked themselves unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub participant: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}
