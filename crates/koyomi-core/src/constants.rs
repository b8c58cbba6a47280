/// Slot grid constants shared across crates
pub const SLOT_INTERVAL_MINUTES: u16 = 30;
pub const MINUTES_PER_DAY: u16 = 1440;

/// Separator between the minute prefix and the date part of a timed slot key
pub const SLOT_KEY_SEPARATOR: &str = "::";

/// Document collection names in the backing store
pub const EVENTS_COLLECTION: &str = "events";
pub const EVENT_DOC_PREFIX: &str = const_str::concat!(EVENTS_COLLECTION, "/");

pub const PROFILES_COLLECTION: &str = "profiles";
pub const PROFILE_DOC_PREFIX: &str = const_str::concat!(PROFILES_COLLECTION, "/");
