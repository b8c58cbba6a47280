#![allow(clippy::unwrap_used)]
//! Tests for the push-driven refresh model: live views subscribe to the
//! event document and re-run the pure aggregation over each snapshot.

use koyomi_test::component::availability::compute_occupancy;
use koyomi_test::component::heatmap::day_occupancy;
use koyomi_test::component::store::{EventStore, MemoryStore};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn subscribers_reaggregate_each_snapshot() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let mut watch = store.subscribe(&event.id).await.unwrap();

    submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")]).await;

    let snapshot = watch.changed().await.unwrap();
    snapshot.verify_invariants().unwrap();
    assert_eq!(compute_occupancy(&snapshot), snapshot.selection_map);
    assert_eq!(day_occupancy(&snapshot, date("2024-01-01")), 1);

    submit(&store, &event.id, &participant("b", "Ben"), &[key("540::2024-01-01")]).await;

    let snapshot = watch.changed().await.unwrap();
    assert_eq!(day_occupancy(&snapshot, date("2024-01-01")), 2);
}

#[test_log::test(tokio::test)]
async fn each_watch_is_independent() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;

    let mut first = store.subscribe(&event.id).await.unwrap();
    let mut second = store.subscribe(&event.id).await.unwrap();

    submit(&store, &event.id, &participant("a", "Alice"), &[key("540::2024-01-01")]).await;

    assert_eq!(first.changed().await.unwrap().respondent_count(), 1);
    assert_eq!(second.changed().await.unwrap().respondent_count(), 1);

    // Dropping one watch is the unsubscribe; the other keeps receiving.
    drop(first);
    submit(&store, &event.id, &participant("b", "Ben"), &[key("570::2024-01-01")]).await;
    assert_eq!(second.changed().await.unwrap().respondent_count(), 2);
}
