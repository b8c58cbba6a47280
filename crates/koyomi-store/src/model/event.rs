//! The `SchedulingEvent` aggregate root.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use koyomi_core::config::LimitsConfig;
use koyomi_core::error::{CoreError, CoreResult};
use koyomi_core::types::ScheduleMode;
use koyomi_slot::slot::SlotKey;

use super::occupancy::OccupancyIndex;
use super::participant::{SelectionRecord, Withdrawal};

/// Participation limits configured per event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slot_occupants: Option<u32>,
    /// Respondent count at which the organizer is notified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&LimitsConfig> for EventLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            max_participants: Some(config.max_participants),
            max_slot_occupants: Some(config.max_slot_occupants),
            notify_threshold: config.notify_threshold,
            expires_at: None,
        }
    }
}

/// One scheduling event: the offered dates or slots, every respondent's
/// answer, and the derived occupancy index.
///
/// The stored field names (`isFullDay`, `selectionMap`, `cannotMakeIt`)
/// are preserved from the existing document layout for interoperability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingEvent {
    pub id: String,
    pub title: String,
    /// Immutable post-creation except via the explicit, destructive mode
    /// conversion, which discards all prior selections.
    #[serde(rename = "isFullDay", with = "full_day_flag")]
    pub mode: ScheduleMode,
    /// Offered days, sorted and deduplicated.
    pub dates: Vec<NaiveDate>,
    /// Offered timed slots, sorted and deduplicated; empty in full-day mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotKey>,
    /// Active respondents in submission order.
    #[serde(default)]
    pub users: Vec<SelectionRecord>,
    /// Inverse index of `users`; maintained by the update engine.
    #[serde(rename = "selectionMap", default)]
    pub selection_map: OccupancyIndex,
    #[serde(rename = "cannotMakeIt", default)]
    pub cannot_make_it: Vec<Withdrawal>,
    #[serde(default)]
    pub limits: EventLimits,
    #[serde(default)]
    pub ended: bool,
    /// Optimistic-concurrency counter, bumped by every stored write.
    #[serde(default)]
    pub revision: i64,
    pub last_updated: DateTime<Utc>,
}

impl SchedulingEvent {
    /// Creates an event with no respondents yet.
    ///
    /// Offered dates and slots are sorted and deduplicated here so every
    /// later read can rely on chronological order.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        mode: ScheduleMode,
        mut dates: Vec<NaiveDate>,
        mut slots: Vec<SlotKey>,
        limits: EventLimits,
        now: DateTime<Utc>,
    ) -> Self {
        dates.sort_unstable();
        dates.dedup();
        slots.sort_unstable();
        slots.dedup();
        Self {
            id: id.into(),
            title: title.into(),
            mode,
            dates,
            slots,
            users: Vec::new(),
            selection_map: OccupancyIndex::new(),
            cannot_make_it: Vec::new(),
            limits,
            ended: false,
            revision: 0,
            last_updated: now,
        }
    }

    /// The offered slot-key set: timed slots in timed mode, the full-day
    /// keys of the offered dates otherwise.
    #[must_use]
    pub fn offered_keys(&self) -> Vec<SlotKey> {
        match self.mode {
            ScheduleMode::FullDay => self.dates.iter().copied().map(SlotKey::full_day).collect(),
            ScheduleMode::Timed => self.slots.clone(),
        }
    }

    /// Whether a key belongs to this event's offered set.
    #[must_use]
    pub fn offers(&self, key: SlotKey) -> bool {
        match self.mode {
            ScheduleMode::FullDay => match key {
                SlotKey::FullDay(date) => self.dates.contains(&date),
                SlotKey::Timed { .. } => false,
            },
            ScheduleMode::Timed => self.slots.contains(&key),
        }
    }

    /// Offered timed slots falling on the given day, in minute order.
    #[must_use]
    pub fn timed_slots_on(&self, day: NaiveDate) -> Vec<SlotKey> {
        self.slots
            .iter()
            .copied()
            .filter(|slot| slot.date() == day)
            .collect()
    }

    /// Number of active respondents. Withdrawn participants do not count.
    #[must_use]
    pub fn respondent_count(&self) -> usize {
        self.users.len()
    }

    /// Returns the active selection record for a participant, if any.
    #[must_use]
    pub fn selection_record(&self, participant_id: &str) -> Option<&SelectionRecord> {
        self.users
            .iter()
            .find(|record| record.participant.id == participant_id)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.limits.expires_at.is_some_and(|expiry| now >= expiry)
    }

    /// Checks the structural invariants of the aggregate.
    ///
    /// `selection_map` must be exactly the inverse of the non-empty
    /// `selected` arrays in `users`, with no empty buckets retained, and
    /// no participant may be both active and withdrawn.
    ///
    /// ## Errors
    /// Returns `CoreError::InvariantViolation` naming the first violated
    /// invariant.
    pub fn verify_invariants(&self) -> CoreResult<()> {
        let mut active_ids = HashSet::new();
        for record in &self.users {
            if !active_ids.insert(record.participant.id.as_str()) {
                return Err(CoreError::InvariantViolation(
                    "duplicate respondent record",
                ));
            }
            if record.selected.is_empty() {
                return Err(CoreError::InvariantViolation(
                    "respondent record with empty selection",
                ));
            }
            for key in &record.selected {
                let in_bucket = self
                    .selection_map
                    .bucket(*key)
                    .is_some_and(|bucket| {
                        bucket.iter().any(|p| p.id == record.participant.id)
                    });
                if !in_bucket {
                    return Err(CoreError::InvariantViolation(
                        "selected slot missing from selection map",
                    ));
                }
            }
        }

        for (key, bucket) in self.selection_map.iter() {
            if bucket.is_empty() {
                return Err(CoreError::InvariantViolation(
                    "empty bucket retained in selection map",
                ));
            }
            for occupant in bucket {
                let selected = self
                    .selection_record(&occupant.id)
                    .is_some_and(|record| record.selected.contains(key));
                if !selected {
                    return Err(CoreError::InvariantViolation(
                        "selection map occupant without matching selection",
                    ));
                }
            }
        }

        for withdrawal in &self.cannot_make_it {
            if active_ids.contains(withdrawal.participant.id.as_str()) {
                return Err(CoreError::InvariantViolation(
                    "participant present in both active and withdrawn lists",
                ));
            }
        }

        Ok(())
    }
}

/// The stored layout keeps the addressing scheme as an `isFullDay` flag.
mod full_day_flag {
    use koyomi_core::types::ScheduleMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(mode: &ScheduleMode, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(mode.is_full_day())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ScheduleMode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let is_full_day = bool::deserialize(deserializer)?;
        Ok(if is_full_day {
            ScheduleMode::FullDay
        } else {
            ScheduleMode::Timed
        })
    }
}
