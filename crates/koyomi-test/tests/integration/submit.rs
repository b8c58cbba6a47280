#![allow(clippy::unwrap_used)]
//! Tests for availability submission.
//!
//! Verifies the respondent-list diffing, the inverse-index invariant,
//! idempotence, withdrawal round-trips, and limit enforcement.

use chrono::Utc;
use futures::future::BoxFuture;

use koyomi_test::component::availability::{SubmitRequest, compute_occupancy, submit_availability};
use koyomi_test::component::ServiceError;
use koyomi_test::component::model::{EventLimits, SchedulingEvent};
use koyomi_test::component::store::{
    EventPatch, EventStore, EventWatch, MemoryStore, StoreResult,
};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn submission_appends_respondent_and_indexes_slots() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");

    let outcome = submit(
        &store,
        &event.id,
        &alice,
        &[key("540::2024-01-01"), key("570::2024-01-01")],
    )
    .await;

    let updated = outcome.event;
    assert_eq!(updated.respondent_count(), 1);
    assert_eq!(updated.selection_map.occupancy(key("540::2024-01-01")), 1);
    assert_eq!(updated.selection_map.occupancy(key("600::2024-01-01")), 0);

    updated.verify_invariants().unwrap();
    assert_eq!(compute_occupancy(&updated), updated.selection_map);
}

#[test_log::test(tokio::test)]
async fn resubmission_is_idempotent() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");
    let selection = [key("540::2024-01-01"), key("570::2024-01-01")];

    let first = submit(&store, &event.id, &alice, &selection).await.event;
    let second = submit(&store, &event.id, &alice, &selection).await.event;

    // Identical modulo timestamp and revision counter.
    assert_eq!(first.users, second.users);
    assert_eq!(first.selection_map, second.selection_map);
    assert_eq!(first.cannot_make_it, second.cannot_make_it);
    second.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn replacement_preserves_record_position() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");
    let ben = participant("b", "Ben");

    submit(&store, &event.id, &alice, &[key("540::2024-01-01")]).await;
    submit(&store, &event.id, &ben, &[key("570::2024-01-01")]).await;
    let updated = submit(&store, &event.id, &alice, &[key("600::2024-01-01")])
        .await
        .event;

    let ids: Vec<&str> = updated
        .users
        .iter()
        .map(|record| record.participant.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(updated.selection_map.occupancy(key("540::2024-01-01")), 0);
    assert_eq!(updated.selection_map.occupancy(key("600::2024-01-01")), 1);
    updated.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn empty_selection_removes_the_respondent_entirely() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");

    submit(&store, &event.id, &alice, &[key("540::2024-01-01")]).await;
    let updated = submit(&store, &event.id, &alice, &[]).await.event;

    assert_eq!(updated.respondent_count(), 0);
    assert!(updated.selection_map.is_empty());
    updated.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn removing_the_last_occupant_drops_the_key() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");
    let ben = participant("b", "Ben");

    submit(&store, &event.id, &alice, &[key("540::2024-01-01")]).await;
    submit(
        &store,
        &event.id,
        &ben,
        &[key("540::2024-01-01"), key("570::2024-01-01")],
    )
    .await;

    // Ben narrows down to 540 only; 570 loses its last occupant.
    let updated = submit(&store, &event.id, &ben, &[key("540::2024-01-01")])
        .await
        .event;

    assert!(!updated.selection_map.contains_key(key("570::2024-01-01")));
    assert_eq!(updated.selection_map.occupancy(key("540::2024-01-01")), 2);
    updated.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn withdrawal_round_trip_restores_buckets() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");
    let ben = participant("b", "Ben");
    let selection = [key("540::2024-01-01"), key("570::2024-01-01")];

    submit(&store, &event.id, &ben, &[key("540::2024-01-01")]).await;
    let before = submit(&store, &event.id, &alice, &selection).await.event;

    let withdrawn = withdraw(&store, &event.id, &alice).await.event;
    assert_eq!(withdrawn.respondent_count(), 1);
    assert_eq!(withdrawn.cannot_make_it.len(), 1);
    assert_eq!(withdrawn.cannot_make_it[0].participant.id, "a");
    assert_eq!(withdrawn.selection_map.occupancy(key("540::2024-01-01")), 1);
    assert!(!withdrawn.selection_map.contains_key(key("570::2024-01-01")));
    withdrawn.verify_invariants().unwrap();

    let restored = submit(&store, &event.id, &alice, &selection).await.event;
    assert_eq!(restored.selection_map, before.selection_map);
    assert!(restored.cannot_make_it.is_empty());
    restored.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn withdrawal_forces_selection_empty() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");

    // Selection submitted alongside a withdrawal is discarded.
    let outcome = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: event.id.clone(),
            participant: alice.clone(),
            selection: vec![key("540::2024-01-01")],
            withdrawing: true,
            comments: Some("out sick".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.event.respondent_count(), 0);
    assert!(outcome.event.selection_map.is_empty());
    assert_eq!(outcome.event.cannot_make_it.len(), 1);
    assert_eq!(
        outcome.event.cannot_make_it[0].comments.as_deref(),
        Some("out sick")
    );
}

#[test_log::test(tokio::test)]
async fn empty_selection_without_prior_record_is_a_no_op() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");

    let outcome = submit(&store, &event.id, &alice, &[]).await;

    assert_eq!(outcome.event.revision, event.revision);
    assert_eq!(outcome.event.respondent_count(), 0);
    assert!(!outcome.notify_triggered);
}

#[test_log::test(tokio::test)]
async fn unknown_event_is_not_found() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let result = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: "missing".to_string(),
            participant: participant("a", "Alice"),
            selection: vec![key("540::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[test_log::test(tokio::test)]
async fn unoffered_slots_are_rejected() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;

    let result = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: event.id.clone(),
            participant: participant("a", "Alice"),
            selection: vec![key("720::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));

    // A full-day key is likewise outside a timed event's offered set.
    let result = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: event.id,
            participant: participant("a", "Alice"),
            selection: vec![key("2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test_log::test(tokio::test)]
async fn duplicate_submitted_keys_collapse() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");

    let updated = submit(
        &store,
        &event.id,
        &alice,
        &[key("540::2024-01-01"), key("540::2024-01-01")],
    )
    .await
    .event;

    assert_eq!(updated.selection_map.occupancy(key("540::2024-01-01")), 1);
    assert_eq!(updated.users[0].selected.len(), 1);
    updated.verify_invariants().unwrap();
}

#[test_log::test(tokio::test)]
async fn participant_limit_is_enforced() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = koyomi_test::component::availability::create_event(
        &store,
        &test_settings(),
        koyomi_test::component::availability::NewEvent {
            title: "Tiny".to_string(),
            mode: koyomi_test::component::types::ScheduleMode::Timed,
            dates: vec![date("2024-01-01")],
            slots: vec![key("540::2024-01-01")],
            limits: Some(EventLimits {
                max_participants: Some(1),
                ..EventLimits::default()
            }),
        },
    )
    .await
    .unwrap();

    submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")]).await;

    let result = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: event.id.clone(),
            participant: participant("b", "Ben"),
            selection: vec![key("540::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));

    // An existing respondent may still update their own answer.
    let updated = submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")])
        .await
        .event;
    assert_eq!(updated.respondent_count(), 1);
}

#[test_log::test(tokio::test)]
async fn slot_occupancy_limit_is_enforced() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = koyomi_test::component::availability::create_event(
        &store,
        &test_settings(),
        koyomi_test::component::availability::NewEvent {
            title: "One seat".to_string(),
            mode: koyomi_test::component::types::ScheduleMode::Timed,
            dates: vec![date("2024-01-01")],
            slots: vec![key("540::2024-01-01"), key("570::2024-01-01")],
            limits: Some(EventLimits {
                max_slot_occupants: Some(1),
                ..EventLimits::default()
            }),
        },
    )
    .await
    .unwrap();

    submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")]).await;

    let result = submit_availability(
        &store,
        &store,
        SubmitRequest {
            event_id: event.id.clone(),
            participant: participant("b", "Ben"),
            selection: vec![key("540::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));

    // The free slot next door is still open.
    let updated = submit(&store, &event.id, &participant("b", "Ben"), &[key("570::2024-01-01")])
        .await
        .event;
    assert_eq!(updated.respondent_count(), 2);
}

#[test_log::test(tokio::test)]
async fn notify_threshold_fires_once_on_crossing() {
    let store = koyomi_test::component::store::MemoryStore::new();
    let event = koyomi_test::component::availability::create_event(
        &store,
        &test_settings(),
        koyomi_test::component::availability::NewEvent {
            title: "Quorum".to_string(),
            mode: koyomi_test::component::types::ScheduleMode::Timed,
            dates: vec![date("2024-01-01")],
            slots: vec![key("540::2024-01-01")],
            limits: Some(EventLimits {
                notify_threshold: Some(2),
                ..EventLimits::default()
            }),
        },
    )
    .await
    .unwrap();

    let first = submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")]).await;
    assert!(!first.notify_triggered);

    let second = submit(&store, &event.id, &participant("b", "Ben"), &[key("540::2024-01-01")]).await;
    assert!(second.notify_triggered);

    // Already past the threshold: updating an answer does not re-fire.
    let third = submit(&store, &event.id, &participant("b", "Ben"), &[key("540::2024-01-01")]).await;
    assert!(!third.notify_triggered);
}

/// Store wrapper that lands a second writer's patch between a
/// submission's load and its own write, forcing the revision check to
/// fail.
struct RacingStore {
    inner: MemoryStore,
}

impl EventStore for RacingStore {
    fn get<'a>(
        &'a self,
        event_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<SchedulingEvent>>> {
        self.inner.get(event_id)
    }

    fn insert<'a>(&'a self, event: SchedulingEvent) -> BoxFuture<'a, StoreResult<()>> {
        self.inner.insert(event)
    }

    fn apply<'a>(
        &'a self,
        event_id: &'a str,
        patch: EventPatch,
    ) -> BoxFuture<'a, StoreResult<SchedulingEvent>> {
        Box::pin(async move {
            self.inner
                .apply(event_id, EventPatch::ended(Utc::now()))
                .await?;
            self.inner.apply(event_id, patch).await
        })
    }

    fn subscribe<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, StoreResult<EventWatch>> {
        self.inner.subscribe(event_id)
    }
}

#[test_log::test(tokio::test)]
async fn interleaved_write_surfaces_as_concurrency_clobber() {
    let store = RacingStore {
        inner: MemoryStore::new(),
    };
    let event = seed_timed_event(&store.inner).await;

    let result = submit_availability(
        &store,
        &store.inner,
        SubmitRequest {
            event_id: event.id.clone(),
            participant: participant("a", "Alice"),
            selection: vec![key("540::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::ConcurrencyClobber(_))));

    // The interleaved write is intact; the losing submission left no trace.
    let stored = store.inner.get(&event.id).await.unwrap().unwrap();
    assert!(stored.ended);
    assert_eq!(stored.respondent_count(), 0);
}

#[test_log::test(tokio::test)]
async fn submissions_record_profile_history() {
    use koyomi_test::component::store::ProfileStore;

    let store = koyomi_test::component::store::MemoryStore::new();
    let first = seed_timed_event(&store).await;
    let second = seed_full_day_event(&store).await;
    let alice = participant("a", "Alice");

    submit(&store, &first.id, &alice, &[key("540::2024-01-01")]).await;
    submit(&store, &second.id, &alice, &[key("2024-01-02")]).await;
    submit(&store, &first.id, &alice, &[key("570::2024-01-01")]).await;

    let profile = store.profile("a").await.unwrap().unwrap();
    assert_eq!(profile.event_history, vec![first.id, second.id]);
}
