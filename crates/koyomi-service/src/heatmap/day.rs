//! Per-day occupancy rollup for calendar-level coloring.

use chrono::NaiveDate;

use koyomi_core::types::ScheduleMode;
use koyomi_slot::slot::SlotKey;
use koyomi_store::model::SchedulingEvent;

/// ## Summary
/// Best single-moment occupancy of one day.
///
/// Full-day events read the day's bucket directly. Timed events take the
/// **maximum** bucket length across the day's offered slots - the calendar
/// heatmap colors by the best moment of the day, not by volume. A day
/// with no offering or no selections yields zero, rendered as a neutral
/// background.
#[must_use]
pub fn day_occupancy(event: &SchedulingEvent, day: NaiveDate) -> usize {
    match event.mode {
        ScheduleMode::FullDay => event.selection_map.occupancy(SlotKey::full_day(day)),
        ScheduleMode::Timed => event
            .timed_slots_on(day)
            .into_iter()
            .map(|slot| event.selection_map.occupancy(slot))
            .max()
            .unwrap_or(0),
    }
}
