//! Inverse index from slot key to the respondents occupying that slot.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use koyomi_slot::slot::SlotKey;

use super::participant::{Participant, SelectionRecord};

/// Mapping from slot key to the ordered-by-insertion set of occupants.
///
/// Owned exclusively by a `SchedulingEvent` and kept as the exact inverse
/// of the non-empty `selected` arrays in its respondent list. A key with
/// no occupants is never retained: downstream code reads absence-of-key
/// as "nobody available", not presence of an empty bucket.
///
/// Keys iterate in the slot keys' total order (chronological); buckets
/// keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancyIndex(BTreeMap<SlotKey, Vec<Participant>>);

impl OccupancyIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from scratch out of the respondent list.
    ///
    /// Selection lists are assumed deduplicated; the update engine
    /// guarantees this before records are persisted.
    #[must_use]
    pub fn rebuild(records: &[SelectionRecord]) -> Self {
        let mut index = Self::new();
        for record in records {
            index.add_participant(&record.participant, &record.selected);
        }
        index
    }

    /// Appends the participant under every given key, creating buckets as
    /// needed.
    pub fn add_participant(&mut self, participant: &Participant, keys: &[SlotKey]) {
        for key in keys {
            self.0.entry(*key).or_default().push(participant.clone());
        }
    }

    /// Filters the participant out of every bucket, dropping keys whose
    /// bucket becomes empty.
    pub fn remove_participant(&mut self, participant_id: &str) {
        self.0.retain(|_, bucket| {
            bucket.retain(|p| p.id != participant_id);
            !bucket.is_empty()
        });
    }

    /// Returns the occupants of a slot, if anyone selected it.
    #[must_use]
    pub fn bucket(&self, key: SlotKey) -> Option<&[Participant]> {
        self.0.get(&key).map(Vec::as_slice)
    }

    /// Returns the number of occupants of a slot, zero when absent.
    #[must_use]
    pub fn occupancy(&self, key: SlotKey) -> usize {
        self.0.get(&key).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn contains_key(&self, key: SlotKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Whether two slots are occupied by the exact same set of respondents.
    ///
    /// Set equality over participant ids, order-insensitive. False when
    /// either slot is absent from the index or bucket lengths differ.
    #[must_use]
    pub fn same_occupants(&self, a: SlotKey, b: SlotKey) -> bool {
        let (Some(left), Some(right)) = (self.bucket(a), self.bucket(b)) else {
            return false;
        };
        if left.len() != right.len() {
            return false;
        }
        let ids: HashSet<&str> = left.iter().map(|p| p.id.as_str()).collect();
        right.iter().all(|p| ids.contains(p.id.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &[Participant])> {
        self.0.iter().map(|(key, bucket)| (key, bucket.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.0.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
