#![allow(clippy::unwrap_used)]
//! Tests for event lifecycle: creation, ending, and mode conversion.

use koyomi_test::component::ServiceError;
use koyomi_test::component::availability::{
    NewEvent, NewOffering, convert_mode, create_event, end_event, load_event,
};
use koyomi_test::component::model::EventLimits;
use koyomi_test::component::store::MemoryStore;
use koyomi_test::component::types::ScheduleMode;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn create_event_fills_defaults_and_persists() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;

    assert!(!event.id.is_empty());
    assert_eq!(event.mode, ScheduleMode::Timed);
    assert_eq!(event.revision, 0);
    assert!(!event.ended);
    // Defaults come from the configured limits.
    assert_eq!(event.limits.max_participants, Some(60));
    assert_eq!(event.limits.max_slot_occupants, Some(60));

    let loaded = load_event(&store, &event.id).await.unwrap();
    assert_eq!(loaded, event);
}

#[test_log::test(tokio::test)]
async fn create_event_rejects_inconsistent_offerings() {
    let store = MemoryStore::new();

    let result = create_event(
        &store,
        &test_settings(),
        NewEvent {
            title: "Broken".to_string(),
            mode: ScheduleMode::FullDay,
            dates: vec![date("2024-01-01")],
            slots: vec![key("540::2024-01-01")],
            limits: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));

    let result = create_event(
        &store,
        &test_settings(),
        NewEvent {
            title: "No dates".to_string(),
            mode: ScheduleMode::Timed,
            dates: Vec::new(),
            slots: vec![key("540::2024-01-01")],
            limits: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test_log::test(tokio::test)]
async fn load_event_maps_absence_to_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(
        load_event(&store, "missing").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[test_log::test(tokio::test)]
async fn end_event_is_idempotent_and_blocks_submissions() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;

    let ended = end_event(&store, &event.id).await.unwrap();
    assert!(ended.ended);

    let again = end_event(&store, &event.id).await.unwrap();
    assert_eq!(again.revision, ended.revision);

    let result = koyomi_test::component::availability::submit_availability(
        &store,
        &store,
        koyomi_test::component::availability::SubmitRequest {
            event_id: event.id.clone(),
            participant: participant("a", "Alice"),
            selection: vec![key("540::2024-01-01")],
            withdrawing: false,
            comments: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test_log::test(tokio::test)]
async fn convert_mode_discards_every_prior_answer() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;
    let alice = participant("a", "Alice");
    let ben = participant("b", "Ben");

    submit(&store, &event.id, &alice, &[key("540::2024-01-01")]).await;
    submit(&store, &event.id, &ben, &[key("570::2024-01-01")]).await;
    withdraw(&store, &event.id, &participant("c", "Chika")).await;

    let converted = convert_mode(
        &store,
        &event.id,
        NewOffering {
            mode: ScheduleMode::FullDay,
            dates: vec![date("2024-01-02"), date("2024-01-01")],
            slots: Vec::new(),
        },
    )
    .await
    .unwrap();

    assert_eq!(converted.mode, ScheduleMode::FullDay);
    assert!(converted.users.is_empty());
    assert!(converted.selection_map.is_empty());
    assert!(converted.cannot_make_it.is_empty());
    assert_eq!(
        converted.dates,
        vec![date("2024-01-01"), date("2024-01-02")]
    );
    converted.verify_invariants().unwrap();

    // The event accepts full-day answers from here on.
    let updated = submit(&store, &event.id, &alice, &[key("2024-01-01")]).await.event;
    assert_eq!(updated.respondent_count(), 1);
}

#[test_log::test(tokio::test)]
async fn convert_mode_rejects_ended_events() {
    let store = MemoryStore::new();
    let event = seed_timed_event(&store).await;
    end_event(&store, &event.id).await.unwrap();

    let result = convert_mode(
        &store,
        &event.id,
        NewOffering {
            mode: ScheduleMode::FullDay,
            dates: vec![date("2024-01-01")],
            slots: Vec::new(),
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test_log::test(tokio::test)]
async fn custom_limits_override_defaults() {
    let store = MemoryStore::new();
    let event = create_event(
        &store,
        &test_settings(),
        NewEvent {
            title: "Capped".to_string(),
            mode: ScheduleMode::FullDay,
            dates: vec![date("2024-01-01")],
            slots: Vec::new(),
            limits: Some(EventLimits {
                max_participants: Some(5),
                notify_threshold: Some(3),
                ..EventLimits::default()
            }),
        },
    )
    .await
    .unwrap();

    assert_eq!(event.limits.max_participants, Some(5));
    assert_eq!(event.limits.max_slot_occupants, None);
    assert_eq!(event.limits.notify_threshold, Some(3));
}
