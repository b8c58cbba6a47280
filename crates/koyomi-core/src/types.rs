use serde::{Deserialize, Serialize};

/// Slot addressing scheme for a scheduling event.
///
/// An event is exclusively one mode for its entire lifetime; switching
/// modes is an explicit, destructive conversion that discards all prior
/// selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Whole calendar days are offered.
    FullDay,
    /// 30-minute slots within offered days.
    Timed,
}

impl ScheduleMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullDay => "full_day",
            Self::Timed => "timed",
        }
    }

    #[must_use]
    pub const fn is_full_day(self) -> bool {
        matches!(self, Self::FullDay)
    }
}

impl std::fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
