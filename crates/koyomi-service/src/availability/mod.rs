//! Availability write path.
//!
//! ## Module Organization
//!
//! - `update`: the submission state machine (select, change, withdraw)
//! - `lifecycle`: event creation, ending, and the destructive mode
//!   conversion
//!
//! This is the only layer permitted to mutate persisted state; everything
//! under `heatmap` is a pure read-side transform over a snapshot.

pub mod lifecycle;
pub mod update;

pub use lifecycle::{NewEvent, NewOffering, convert_mode, create_event, end_event, load_event};
pub use update::{SubmitOutcome, SubmitRequest, submit_availability};

use koyomi_store::model::{OccupancyIndex, SchedulingEvent};

/// Derives the occupancy index from scratch out of an event's respondent
/// list. The stored `selection_map` is maintained incrementally; this is
/// the authoritative recomputation the stored value must always equal.
#[must_use]
pub fn compute_occupancy(event: &SchedulingEvent) -> OccupancyIndex {
    OccupancyIndex::rebuild(&event.users)
}
