//! Read-side heatmap aggregation.
//!
//! ## Module Organization
//!
//! - `color`: occupancy-ratio to display-color mapping (discrete palette
//!   buckets and continuous alpha blending)
//! - `runs`: temporal run merging of visually identical adjacent slots
//! - `day`: per-day rollup for calendar-level coloring
//!
//! Everything here is pure and referentially transparent over an
//! immutable event snapshot; no hidden memoization, no mutation. Multiple
//! views may run these concurrently over independently obtained
//! snapshots.

pub mod color;
pub mod day;
pub mod runs;

pub use color::{Color, ColorPolicy, ColorRange, bucket_index, color_for};
pub use day::day_occupancy;
pub use runs::{
    SlotRun, count_consecutive_identical_slots, has_occupants_in_next_slot,
    is_same_occupancy_as_next, is_same_occupancy_as_previous, merge_runs, run_duration_label,
};
