//! Availability submission state machine.

#![allow(clippy::too_many_lines)] // Service orchestration functions are inherently complex

use chrono::Utc;
use serde::{Deserialize, Serialize};

use koyomi_slot::slot::SlotKey;
use koyomi_store::error::StoreError;
use koyomi_store::model::{Participant, SchedulingEvent, SelectionRecord, UserProfile, Withdrawal};
use koyomi_store::store::{EventPatch, EventStore, ProfileStore};

use crate::error::{ServiceError, ServiceResult};

/// One availability submission: a participant's new selection set, or
/// their withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub event_id: String,
    pub participant: Participant,
    /// Ignored when `withdrawing` is set.
    pub selection: Vec<SlotKey>,
    pub withdrawing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Result of a submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub event: SchedulingEvent,
    /// True exactly when this update made the respondent count cross the
    /// event's notify threshold from below. Delivery is the caller's
    /// concern.
    pub notify_triggered: bool,
}

/// ## Summary
/// Applies one participant's new selection set (or withdrawal) to an
/// event as a single atomic read-modify-write.
///
/// The respondent list is diffed minimally: a new record is appended, an
/// existing one is replaced in place, and a record whose selection became
/// empty is removed entirely. The occupancy index is patched by removing
/// the participant from every bucket (dropping emptied keys) and
/// re-adding them under the new selection.
///
/// ## Side Effects
/// - Persists `{users, selection_map, cannot_make_it, last_updated}` as
///   one patch carrying the loaded revision
/// - Records the event id at the front of the participant's profile
///   history
///
/// ## Errors
/// Returns an error if:
/// - the event id does not resolve (`NotFound`)
/// - the event has ended, a submitted key is outside the offered set, or
///   a participation limit would be exceeded (`ValidationError`)
/// - an interleaved write moved the event on (`ConcurrencyClobber`)
/// - the store fails
#[tracing::instrument(skip(events, profiles, request), fields(
    event_id = %request.event_id,
    participant_id = %request.participant.id,
    withdrawing = request.withdrawing,
    selection_len = request.selection.len()
))]
pub async fn submit_availability(
    events: &dyn EventStore,
    profiles: &dyn ProfileStore,
    request: SubmitRequest,
) -> ServiceResult<SubmitOutcome> {
    tracing::debug!("Processing availability submission");

    let SubmitRequest {
        event_id,
        participant,
        selection,
        withdrawing,
        comments,
    } = request;

    let event = events
        .get(&event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))?;

    if event.ended {
        return Err(ServiceError::ValidationError(format!(
            "event {} has ended",
            event.id
        )));
    }

    // A withdrawal forces the effective selection empty regardless of
    // what was submitted alongside it.
    let effective = if withdrawing {
        Vec::new()
    } else {
        dedup_selection(&selection)
    };

    validate_selection(&event, &effective)?;

    let existing_position = event
        .users
        .iter()
        .position(|record| record.participant.id == participant.id);

    if effective.is_empty() && existing_position.is_none() && !withdrawing {
        tracing::debug!("Empty selection with no prior record, succeeding as a no-op");
        return Ok(SubmitOutcome {
            event,
            notify_triggered: false,
        });
    }

    if existing_position.is_none()
        && !effective.is_empty()
        && let Some(max) = event.limits.max_participants
        && usize::try_from(max).is_ok_and(|max| event.users.len() >= max)
    {
        return Err(ServiceError::ValidationError(format!(
            "event {} already has {max} participants",
            event.id
        )));
    }

    let mut users = event.users.clone();
    match existing_position {
        Some(position) if effective.is_empty() => {
            users.remove(position);
        }
        Some(position) => {
            users[position].selected = effective.clone();
            users[position].comments = comments.clone();
        }
        None if effective.is_empty() => {
            // Withdrawing without a prior record: nothing to diff here,
            // only the withdrawn list changes below.
        }
        None => {
            users.push(SelectionRecord {
                participant: participant.clone(),
                selected: effective.clone(),
                comments: comments.clone(),
            });
        }
    }

    // Remove-then-add keeps a re-selection of the same slot from ever
    // double-counting; the removal also drops any key whose bucket
    // becomes empty.
    let mut selection_map = event.selection_map.clone();
    selection_map.remove_participant(&participant.id);

    if let Some(max) = event.limits.max_slot_occupants {
        let max = usize::try_from(max).unwrap_or(usize::MAX);
        for key in &effective {
            if selection_map.occupancy(*key) >= max {
                return Err(ServiceError::ValidationError(format!(
                    "slot {key} already has {max} occupants"
                )));
            }
        }
    }

    selection_map.add_participant(&participant, &effective);

    let mut cannot_make_it = event.cannot_make_it.clone();
    cannot_make_it.retain(|withdrawal| withdrawal.participant.id != participant.id);
    if withdrawing {
        cannot_make_it.push(Withdrawal {
            participant: participant.clone(),
            comments,
        });
    }

    let notify_triggered = event
        .limits
        .notify_threshold
        .and_then(|threshold| usize::try_from(threshold).ok())
        .is_some_and(|threshold| event.users.len() < threshold && users.len() >= threshold);

    let patch = EventPatch::availability(users, selection_map, cannot_make_it, Utc::now())
        .with_expected_revision(event.revision);

    let updated = match events.apply(&event.id, patch).await {
        Ok(updated) => updated,
        Err(StoreError::RevisionMismatch { expected, actual }) => {
            tracing::warn!(expected, actual, "Event changed under this submission");
            return Err(ServiceError::ConcurrencyClobber(format!(
                "event {} moved from revision {expected} to {actual} during update",
                event.id
            )));
        }
        Err(e) => return Err(e.into()),
    };

    if notify_triggered {
        tracing::info!(
            respondents = updated.respondent_count(),
            "Respondent threshold reached"
        );
    }

    let mut profile = profiles
        .profile(&participant.id)
        .await?
        .unwrap_or_else(|| profile_from_participant(&participant));
    profile.record_event(&updated.id);
    profiles.upsert_profile(profile).await?;

    tracing::debug!(revision = updated.revision, "Availability submission persisted");
    Ok(SubmitOutcome {
        event: updated,
        notify_triggered,
    })
}

/// Deduplicates a submitted selection, first occurrence winning, so
/// downstream code and the stored record never see duplicates.
fn dedup_selection(selection: &[SlotKey]) -> Vec<SlotKey> {
    let mut deduped: Vec<SlotKey> = Vec::with_capacity(selection.len());
    for key in selection {
        if !deduped.contains(key) {
            deduped.push(*key);
        }
    }
    deduped
}

/// Every submitted key must belong to the event's offered set, which also
/// pins it to the event's addressing scheme.
fn validate_selection(event: &SchedulingEvent, selection: &[SlotKey]) -> ServiceResult<()> {
    for key in selection {
        if !event.offers(*key) {
            return Err(ServiceError::ValidationError(format!(
                "slot {key} is not offered by event {}",
                event.id
            )));
        }
    }
    Ok(())
}

fn profile_from_participant(participant: &Participant) -> UserProfile {
    let (first_name, last_name) = match participant.name.split_once(' ') {
        Some((first, last)) => (first.to_string(), Some(last.to_string())),
        None => (participant.name.clone(), None),
    };
    UserProfile {
        id: participant.id.clone(),
        first_name,
        last_name,
        photo_url: participant.photo_url.clone(),
        event_history: Vec::new(),
    }
}
