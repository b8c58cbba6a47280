//! Event lifecycle: creation, ending, and mode conversion.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use koyomi_core::config::Settings;
use koyomi_core::types::ScheduleMode;
use koyomi_slot::slot::SlotKey;
use koyomi_store::error::StoreError;
use koyomi_store::model::{EventLimits, SchedulingEvent};
use koyomi_store::store::{EventPatch, EventStore};

use crate::error::{ServiceError, ServiceResult};

/// Parameters for a newly proposed scheduling event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub mode: ScheduleMode,
    pub dates: Vec<NaiveDate>,
    /// Offered timed slots; must be empty in full-day mode.
    #[serde(default)]
    pub slots: Vec<SlotKey>,
    /// Unset limits fall back to the configured defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<EventLimits>,
}

/// Replacement offering for a mode conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffering {
    pub mode: ScheduleMode,
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub slots: Vec<SlotKey>,
}

/// ## Summary
/// Creates a scheduling event with a fresh id and no respondents.
///
/// ## Errors
/// Returns a validation error when the offering is inconsistent with the
/// chosen mode, or a store error when the insert fails.
#[tracing::instrument(skip(events, settings, new_event), fields(title = %new_event.title, mode = %new_event.mode))]
pub async fn create_event(
    events: &dyn EventStore,
    settings: &Settings,
    new_event: NewEvent,
) -> ServiceResult<SchedulingEvent> {
    validate_offering(new_event.mode, &new_event.dates, &new_event.slots)?;

    let limits = new_event
        .limits
        .unwrap_or_else(|| EventLimits::from(&settings.limits));

    let event = SchedulingEvent::new(
        uuid::Uuid::new_v4().to_string(),
        new_event.title,
        new_event.mode,
        new_event.dates,
        new_event.slots,
        limits,
        Utc::now(),
    );

    events.insert(event.clone()).await?;
    tracing::info!(event_id = %event.id, "Event created");
    Ok(event)
}

/// ## Summary
/// Loads an event, mapping absence to `NotFound`.
///
/// ## Errors
/// Returns `NotFound` when the id does not resolve, or a store error.
pub async fn load_event(
    events: &dyn EventStore,
    event_id: &str,
) -> ServiceResult<SchedulingEvent> {
    events
        .get(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))
}

/// ## Summary
/// Marks an event as ended; further submissions are rejected. Idempotent.
///
/// ## Errors
/// Returns `NotFound` for an unknown id, `ConcurrencyClobber` when an
/// interleaved write moved the event on, or a store error.
#[tracing::instrument(skip(events))]
pub async fn end_event(
    events: &dyn EventStore,
    event_id: &str,
) -> ServiceResult<SchedulingEvent> {
    let event = load_event(events, event_id).await?;
    if event.ended {
        return Ok(event);
    }

    let patch = EventPatch::ended(Utc::now()).with_expected_revision(event.revision);
    apply_checked(events, event_id, patch).await
}

/// ## Summary
/// Converts an event to a new addressing scheme and offering.
///
/// This is the explicit, destructive operation: every respondent record,
/// the entire occupancy index, and the withdrawn list are discarded with
/// the old offering. It is never performed implicitly by a generic
/// update.
///
/// ## Errors
/// Returns a validation error for an inconsistent offering or an ended
/// event, `NotFound` for an unknown id, or `ConcurrencyClobber` when an
/// interleaved write moved the event on.
#[tracing::instrument(skip(events, offering), fields(mode = %offering.mode))]
pub async fn convert_mode(
    events: &dyn EventStore,
    event_id: &str,
    offering: NewOffering,
) -> ServiceResult<SchedulingEvent> {
    validate_offering(offering.mode, &offering.dates, &offering.slots)?;

    let event = load_event(events, event_id).await?;
    if event.ended {
        return Err(ServiceError::ValidationError(format!(
            "event {event_id} has ended"
        )));
    }

    let mut dates = offering.dates;
    dates.sort_unstable();
    dates.dedup();
    let mut slots = offering.slots;
    slots.sort_unstable();
    slots.dedup();

    tracing::info!(
        discarded_respondents = event.users.len(),
        "Converting event mode, discarding all prior selections"
    );

    let patch = EventPatch::offering(offering.mode, dates, slots, Utc::now())
        .with_expected_revision(event.revision);
    apply_checked(events, event_id, patch).await
}

async fn apply_checked(
    events: &dyn EventStore,
    event_id: &str,
    patch: EventPatch,
) -> ServiceResult<SchedulingEvent> {
    match events.apply(event_id, patch).await {
        Ok(updated) => Ok(updated),
        Err(StoreError::RevisionMismatch { expected, actual }) => {
            Err(ServiceError::ConcurrencyClobber(format!(
                "event {event_id} moved from revision {expected} to {actual} during update"
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// An offering must be internally consistent with its addressing scheme:
/// full-day events offer dates only; timed events offer grid-aligned
/// slots whose dates are all among the offered days.
fn validate_offering(
    mode: ScheduleMode,
    dates: &[NaiveDate],
    slots: &[SlotKey],
) -> ServiceResult<()> {
    if dates.is_empty() {
        return Err(ServiceError::ValidationError(
            "an event must offer at least one date".to_string(),
        ));
    }

    match mode {
        ScheduleMode::FullDay => {
            if !slots.is_empty() {
                return Err(ServiceError::ValidationError(
                    "a full-day event cannot offer timed slots".to_string(),
                ));
            }
        }
        ScheduleMode::Timed => {
            if slots.is_empty() {
                return Err(ServiceError::ValidationError(
                    "a timed event must offer at least one slot".to_string(),
                ));
            }
            for slot in slots {
                if slot.minute().is_none() {
                    return Err(ServiceError::ValidationError(format!(
                        "offered slot {slot} is not a timed slot"
                    )));
                }
                if !dates.contains(&slot.date()) {
                    return Err(ServiceError::ValidationError(format!(
                        "offered slot {slot} falls outside the offered dates"
                    )));
                }
            }
        }
    }
    Ok(())
}
