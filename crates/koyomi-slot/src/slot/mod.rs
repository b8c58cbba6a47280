//! Slot key addressing for schedulable units of time.
//!
//! ## Module Organization
//!
//! - `key`: the typed `SlotKey` (full-day or timed), its total ordering,
//!   string codec, and 30-minute grid arithmetic
//! - `codec`: string-level helpers for the persistence boundary, where
//!   keys live as raw strings inside stored documents

pub mod codec;
pub mod key;

pub use codec::{date_part, encode_full_day, encode_timed, minute_part};
pub use key::SlotKey;
