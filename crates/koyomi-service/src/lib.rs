//! Koyomi availability engine - write path and read-side aggregation.

pub mod availability;
pub mod error;
pub mod heatmap;
pub mod identity;
