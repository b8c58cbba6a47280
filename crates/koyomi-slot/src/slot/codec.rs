//! String-level slot key helpers for the persistence boundary.
//!
//! Stored documents keep slot keys as raw strings. These helpers operate on
//! that form directly so both addressing schemes can share one decode path:
//! a full-day key has no separator and *is* its own date part.

use chrono::NaiveDate;
use koyomi_core::constants::SLOT_KEY_SEPARATOR;

use crate::error::{SlotError, SlotResult};
use crate::slot::key::SlotKey;

/// Encodes a full-day slot key. Total, no failure.
#[must_use]
pub fn encode_full_day(date: NaiveDate) -> String {
    SlotKey::full_day(date).to_string()
}

/// Encodes a timed slot key.
///
/// ## Errors
/// Rejects minute offsets outside `[0, 1440)` or off the 30-minute grid.
pub fn encode_timed(date: NaiveDate, minute: u16) -> SlotResult<String> {
    Ok(SlotKey::timed(date, minute)?.to_string())
}

/// Returns the date part of an encoded key.
///
/// For a timed key this is the substring after the separator; a key with
/// no separator is returned unchanged.
#[must_use]
pub fn date_part(key: &str) -> &str {
    key.split_once(SLOT_KEY_SEPARATOR)
        .map_or(key, |(_, date)| date)
}

/// Returns the minute part of an encoded key.
///
/// For a timed key this parses the numeric prefix before the separator.
/// A key with no separator is parsed as a bare number; callers in
/// timed-mode paths must not pass a pure date key here.
///
/// ## Errors
/// Returns a parse error when the minute portion is not a number.
pub fn minute_part(key: &str) -> SlotResult<u16> {
    let minute_str = key
        .split_once(SLOT_KEY_SEPARATOR)
        .map_or(key, |(minute, _)| minute);
    minute_str
        .parse::<u16>()
        .map_err(|e| SlotError::ParseError(format!("invalid minute part in '{key}': {e}")))
}
