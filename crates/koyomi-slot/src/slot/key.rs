//! Typed slot keys with total ordering and a canonical string form.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use koyomi_core::constants::{MINUTES_PER_DAY, SLOT_INTERVAL_MINUTES, SLOT_KEY_SEPARATOR};
use koyomi_core::types::ScheduleMode;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SlotError, SlotResult};

/// Identifier for a unit of schedulable time.
///
/// Two addressing schemes exist: whole calendar days, and 30-minute slots
/// addressed by their minute offset since midnight. A scheduling event uses
/// exactly one scheme for all of its keys.
///
/// The canonical string form is `yyyy-MM-dd` for full-day keys and
/// `"{minute}::{yyyy-MM-dd}"` for timed keys. Lexicographic order of the
/// full-day form equals chronological order because the format is
/// zero-padded ISO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// A whole calendar day, no timezone component.
    FullDay(NaiveDate),
    /// A 30-minute slot within a day, addressed by minutes since midnight.
    Timed { date: NaiveDate, minute: u16 },
}

impl SlotKey {
    /// Creates a full-day key. Total, no failure.
    #[must_use]
    pub const fn full_day(date: NaiveDate) -> Self {
        Self::FullDay(date)
    }

    /// Creates a timed key.
    ///
    /// ## Errors
    /// Rejects (rather than clamps) minute offsets outside `[0, 1440)` and
    /// offsets that are not aligned to the 30-minute grid.
    pub const fn timed(date: NaiveDate, minute: u16) -> SlotResult<Self> {
        if minute >= MINUTES_PER_DAY {
            return Err(SlotError::MinuteOutOfRange(minute));
        }
        if minute % SLOT_INTERVAL_MINUTES != 0 {
            return Err(SlotError::UnalignedMinute(minute));
        }
        Ok(Self::Timed { date, minute })
    }

    /// Returns the calendar date this key falls on.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        match self {
            Self::FullDay(date) | Self::Timed { date, .. } => date,
        }
    }

    /// Returns the minute offset for timed keys.
    #[must_use]
    pub const fn minute(self) -> Option<u16> {
        match self {
            Self::FullDay(_) => None,
            Self::Timed { minute, .. } => Some(minute),
        }
    }

    /// Returns the addressing scheme of this key.
    #[must_use]
    pub const fn mode(self) -> ScheduleMode {
        match self {
            Self::FullDay(_) => ScheduleMode::FullDay,
            Self::Timed { .. } => ScheduleMode::Timed,
        }
    }

    /// Returns the slot 30 minutes earlier on the same day.
    ///
    /// `None` for full-day keys and when the step would cross into the
    /// previous calendar day.
    #[must_use]
    pub const fn previous_in_day(self) -> Option<Self> {
        match self {
            Self::FullDay(_) => None,
            Self::Timed { date, minute } => {
                if minute < SLOT_INTERVAL_MINUTES {
                    None
                } else {
                    Some(Self::Timed {
                        date,
                        minute: minute - SLOT_INTERVAL_MINUTES,
                    })
                }
            }
        }
    }

    /// Returns the slot 30 minutes later on the same day.
    ///
    /// `None` for full-day keys and when the step would cross into the
    /// next calendar day.
    #[must_use]
    pub const fn next_in_day(self) -> Option<Self> {
        match self {
            Self::FullDay(_) => None,
            Self::Timed { date, minute } => {
                if minute + SLOT_INTERVAL_MINUTES >= MINUTES_PER_DAY {
                    None
                } else {
                    Some(Self::Timed {
                        date,
                        minute: minute + SLOT_INTERVAL_MINUTES,
                    })
                }
            }
        }
    }

}

impl Ord for SlotKey {
    /// Date-major, minute-minor; a full-day key sorts before any timed
    /// key on the same date.
    fn cmp(&self, other: &Self) -> Ordering {
        self.date()
            .cmp(&other.date())
            .then_with(|| self.minute().cmp(&other.minute()))
    }
}

impl PartialOrd for SlotKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullDay(date) => write!(f, "{date}"),
            Self::Timed { date, minute } => {
                write!(f, "{minute}{SLOT_KEY_SEPARATOR}{date}")
            }
        }
    }
}

impl FromStr for SlotKey {
    type Err = SlotError;

    fn from_str(s: &str) -> SlotResult<Self> {
        match s.split_once(SLOT_KEY_SEPARATOR) {
            Some((minute_str, date_str)) => {
                let minute = minute_str
                    .parse::<u16>()
                    .map_err(|e| SlotError::ParseError(format!("invalid minute offset: {e}")))?;
                Self::timed(parse_date(date_str)?, minute)
            }
            None => Ok(Self::full_day(parse_date(s)?)),
        }
    }
}

fn parse_date(s: &str) -> SlotResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SlotError::ParseError(format!("invalid date '{s}': {e}")))
}

impl Serialize for SlotKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct SlotKeyVisitor;

impl Visitor<'_> for SlotKeyVisitor {
    type Value = SlotKey;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a slot key string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SlotKeyVisitor)
    }
}
