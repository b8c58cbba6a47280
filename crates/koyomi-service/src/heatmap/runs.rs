//! Temporal run merging of visually identical adjacent slots.
//!
//! Two adjacent 30-minute slots render as one block when the exact same
//! set of respondents occupies both. All predicates here compare the
//! physical 30-minute neighbor within the same calendar day; an absent
//! slot (nobody available, or not offered) never matches anything, so
//! gaps and day boundaries always break a run.

use chrono::NaiveDate;

use koyomi_core::constants::SLOT_INTERVAL_MINUTES;
use koyomi_slot::slot::SlotKey;
use koyomi_store::model::{OccupancyIndex, Participant, SchedulingEvent};

/// Whether the slot 30 minutes earlier has the exact same occupant set.
#[must_use]
pub fn is_same_occupancy_as_previous(index: &OccupancyIndex, slot: SlotKey) -> bool {
    slot.previous_in_day()
        .is_some_and(|previous| index.same_occupants(previous, slot))
}

/// Whether the slot 30 minutes later has the exact same occupant set.
#[must_use]
pub fn is_same_occupancy_as_next(index: &OccupancyIndex, slot: SlotKey) -> bool {
    slot.next_in_day()
        .is_some_and(|next| index.same_occupants(slot, next))
}

/// Whether anyone at all occupies the next slot of the day. The rendering
/// layer draws a run-boundary marker exactly where this turns false.
#[must_use]
pub fn has_occupants_in_next_slot(index: &OccupancyIndex, slot: SlotKey) -> bool {
    slot.next_in_day()
        .is_some_and(|next| index.occupancy(next) > 0)
}

/// Number of consecutive following slots with an identical occupant set,
/// capped at the day boundary.
#[must_use]
pub fn count_consecutive_identical_slots(index: &OccupancyIndex, slot: SlotKey) -> usize {
    let mut count = 0;
    let mut current = slot;
    while let Some(next) = current.next_in_day() {
        if !is_same_occupancy_as_previous(index, next) {
            break;
        }
        count += 1;
        current = next;
    }
    count
}

/// Duration of the run starting at this slot, formatted in hours.
///
/// A lone slot reads "0.5 hrs"; three identical followers make "2 hrs".
#[must_use]
pub fn run_duration_label(index: &OccupancyIndex, slot: SlotKey) -> String {
    let slot_count = 1 + count_consecutive_identical_slots(index, slot);
    format_hours(slot_count * usize::from(SLOT_INTERVAL_MINUTES))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "run lengths are bounded by the 48-slot day"
)]
fn format_hours(minutes: usize) -> String {
    if minutes % 60 == 0 {
        format!("{} hrs", minutes / 60)
    } else {
        format!("{:.1} hrs", minutes as f64 / 60.0)
    }
}

/// One merged block of visually identical consecutive slots.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRun {
    pub start: SlotKey,
    pub slot_count: usize,
    /// Shared occupant set of the run; empty for unoccupied slots.
    pub occupants: Vec<Participant>,
}

impl SlotRun {
    /// Total run length in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> usize {
        self.slot_count * usize::from(SLOT_INTERVAL_MINUTES)
    }
}

/// ## Summary
/// Groups one day's offered slots into runs of identical occupancy.
///
/// Unoccupied slots never merge with their neighbors; each renders as its
/// own single-slot run, matching the predicate semantics above.
#[must_use]
pub fn merge_runs(event: &SchedulingEvent, day: NaiveDate) -> Vec<SlotRun> {
    let index = &event.selection_map;
    let mut runs: Vec<SlotRun> = Vec::new();

    for slot in event.timed_slots_on(day) {
        match runs.last_mut() {
            Some(run) if is_same_occupancy_as_previous(index, slot) => {
                run.slot_count += 1;
            }
            _ => runs.push(SlotRun {
                start: slot,
                slot_count: 1,
                occupants: index
                    .bucket(slot)
                    .map_or_else(Vec::new, <[Participant]>::to_vec),
            }),
        }
    }

    runs
}
