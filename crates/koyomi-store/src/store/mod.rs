//! Document store interface for scheduling events and user profiles.
//!
//! ## Module Organization
//!
//! - this module: the `EventStore`/`ProfileStore` traits, the atomic
//!   `EventPatch` partial write, and change subscriptions
//! - `memory`: in-process reference implementation backing tests and
//!   embedded use
//!
//! The production document database sits behind these traits; the engine
//! never talks to it directly.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use tokio::sync::broadcast;

use koyomi_core::types::ScheduleMode;
use koyomi_slot::slot::SlotKey;

use crate::error::{StoreError, StoreResult};
use crate::model::{OccupancyIndex, SchedulingEvent, SelectionRecord, UserProfile, Withdrawal};

pub mod memory;

pub use memory::MemoryStore;

/// A partial-field update applied to one event document in a single
/// atomic write. Fields left as `None` are untouched.
///
/// Applying any patch bumps the document's revision counter. A patch
/// carrying `expected_revision` is rejected when the stored revision has
/// moved on, so interleaved read-modify-write cycles surface as conflicts
/// instead of silently clobbering each other.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub users: Option<Vec<SelectionRecord>>,
    pub selection_map: Option<OccupancyIndex>,
    pub cannot_make_it: Option<Vec<Withdrawal>>,
    pub mode: Option<ScheduleMode>,
    pub dates: Option<Vec<NaiveDate>>,
    pub slots: Option<Vec<SlotKey>>,
    pub ended: Option<bool>,
    pub last_updated: Option<DateTime<Utc>>,
    pub expected_revision: Option<i64>,
}

impl EventPatch {
    /// The availability write of the update engine: respondent list,
    /// inverse index, and withdrawn list replaced together.
    #[must_use]
    pub fn availability(
        users: Vec<SelectionRecord>,
        selection_map: OccupancyIndex,
        cannot_make_it: Vec<Withdrawal>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            users: Some(users),
            selection_map: Some(selection_map),
            cannot_make_it: Some(cannot_make_it),
            last_updated: Some(last_updated),
            ..Self::default()
        }
    }

    /// The destructive mode/offering conversion: replaces the addressing
    /// scheme and offered set and wipes every prior answer with it.
    #[must_use]
    pub fn offering(
        mode: ScheduleMode,
        dates: Vec<NaiveDate>,
        slots: Vec<SlotKey>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            users: Some(Vec::new()),
            selection_map: Some(OccupancyIndex::new()),
            cannot_make_it: Some(Vec::new()),
            mode: Some(mode),
            dates: Some(dates),
            slots: Some(slots),
            last_updated: Some(last_updated),
            ..Self::default()
        }
    }

    /// Marks the event as ended.
    #[must_use]
    pub fn ended(last_updated: DateTime<Utc>) -> Self {
        Self {
            ended: Some(true),
            last_updated: Some(last_updated),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_expected_revision(mut self, revision: i64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    /// Applies every set field to the event and bumps its revision.
    ///
    /// The caller is responsible for the `expected_revision` check; store
    /// implementations run it inside their critical section.
    pub fn apply_to(self, event: &mut SchedulingEvent) {
        if let Some(users) = self.users {
            event.users = users;
        }
        if let Some(selection_map) = self.selection_map {
            event.selection_map = selection_map;
        }
        if let Some(cannot_make_it) = self.cannot_make_it {
            event.cannot_make_it = cannot_make_it;
        }
        if let Some(mode) = self.mode {
            event.mode = mode;
        }
        if let Some(dates) = self.dates {
            event.dates = dates;
        }
        if let Some(slots) = self.slots {
            event.slots = slots;
        }
        if let Some(ended) = self.ended {
            event.ended = ended;
        }
        if let Some(last_updated) = self.last_updated {
            event.last_updated = last_updated;
        }
        event.revision += 1;
    }
}

/// Live change subscription to one event document.
///
/// Every successful write publishes the new snapshot; dropping the watch
/// unsubscribes. Slow readers skip intermediate snapshots rather than
/// erroring.
pub struct EventWatch {
    receiver: broadcast::Receiver<SchedulingEvent>,
}

impl EventWatch {
    pub(crate) const fn new(receiver: broadcast::Receiver<SchedulingEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next stored snapshot of the event.
    ///
    /// ## Errors
    /// Returns `StoreError::SubscriptionClosed` once the store side of the
    /// channel is gone.
    pub async fn changed(&mut self) -> StoreResult<SchedulingEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Ok(snapshot),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(StoreError::SubscriptionClosed);
                }
            }
        }
    }
}

/// Event document access. One document per scheduling event, addressed by
/// id, with atomic partial-field writes and change subscriptions.
pub trait EventStore: Send + Sync {
    fn get<'a>(
        &'a self,
        event_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<SchedulingEvent>>>;

    fn insert<'a>(&'a self, event: SchedulingEvent) -> BoxFuture<'a, StoreResult<()>>;

    fn apply<'a>(
        &'a self,
        event_id: &'a str,
        patch: EventPatch,
    ) -> BoxFuture<'a, StoreResult<SchedulingEvent>>;

    fn subscribe<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, StoreResult<EventWatch>>;
}

/// User profile document access.
pub trait ProfileStore: Send + Sync {
    fn profile<'a>(&'a self, user_id: &'a str)
    -> BoxFuture<'a, StoreResult<Option<UserProfile>>>;

    fn upsert_profile<'a>(&'a self, profile: UserProfile) -> BoxFuture<'a, StoreResult<()>>;
}
