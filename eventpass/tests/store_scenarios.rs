//! Integration tests for the application store
//!
//! Drives a real `AppStore` through the dispatch path: reducer, broadcast,
//! snapshots and the provider scope.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{Duration, Utc};
use eventpass::{
    AppAction, AppEnvironment, AppError, AppProvider, AppState, AppStore, AttendeeId,
    CapacityPolicy, CheckInRequest, Config, Event, EventDraft, EventId, EventPatch, EventStatus,
    ProviderError, StoreError, app_actions, build_store, dispatch_json, use_app_state,
};
use eventpass_runtime::Store;
use eventpass_testing::{SequentialIds, SteppingClock, test_clock, test_epoch};
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

fn demo_event(id: &str) -> Event {
    EventDraft {
        title: "Demo".to_string(),
        description: "Scenario event".to_string(),
        date: "2024-07-15".to_string(),
        time: "14:00".to_string(),
        location: "Hall A".to_string(),
        price: 20.0,
        capacity: 100,
    }
    .into_event(EventId::from(id), test_epoch())
}

fn ann(id: &str, pass_code: &str) -> CheckInRequest {
    CheckInRequest {
        id: AttendeeId::from(id),
        name: "Ann".to_string(),
        pass_code: pass_code.to_string(),
        event_id: EventId::from("e1"),
    }
}

fn empty_store() -> AppStore {
    let env = AppEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIds::new("evt")));
    Store::new(AppState::new(), eventpass::AppReducer::new(), env)
}

fn store_with(env: AppEnvironment) -> AppStore {
    Store::new(AppState::new(), eventpass::AppReducer::new(), env)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn add_event_to_empty_store() {
    let store = empty_store();

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();

    let events = store.state(|s| Arc::clone(&s.events)).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Demo");
}

#[tokio::test]
async fn add_then_delete_leaves_no_events() {
    let store = empty_store();

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    store.send(app_actions::delete_event("e1")).await.unwrap();

    assert!(store.state(|s| s.events.is_empty()).await);
}

#[tokio::test]
async fn update_status_keeps_other_fields() {
    let store = empty_store();

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    store
        .send(app_actions::update_event(
            "e1",
            EventPatch::default().with_status(EventStatus::Live),
        ))
        .await
        .unwrap();

    let event = store.state(|s| s.events[0].clone()).await;
    assert_eq!(event.status, EventStatus::Live);
    assert_eq!(event.title, "Demo");
}

#[tokio::test]
async fn check_in_records_time_after_test_start() {
    let started = Utc::now();
    let store = store_with(AppEnvironment::production());

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    store.send(app_actions::check_in_attendee(ann("c1", "P1"))).await.unwrap();

    let log = store.state(|s| Arc::clone(&s.checked_in_attendees)).await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].event_id, EventId::from("e1"));
    assert!(log[0].checked_in_at >= started);
}

#[tokio::test]
async fn update_of_missing_event_changes_nothing() {
    let store = empty_store();
    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    let before = store.snapshot().await;

    let result = store
        .send(app_actions::update_event("missing", EventPatch::default().with_price(1.0)))
        .await;

    assert!(matches!(
        result,
        Err(StoreError::Rejected(AppError::EventNotFound(ref id))) if id.as_str() == "missing"
    ));
    let after = store.snapshot().await;
    assert_eq!(after, before);
    assert!(Arc::ptr_eq(&after.events, &before.events));
}

// ============================================================================
// Structural sharing
// ============================================================================

#[tokio::test]
async fn untouched_collections_are_shared_between_snapshots() {
    let store = empty_store();
    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();

    let before = store.snapshot().await;
    store.send(app_actions::check_in_attendee(ann("c1", "P1"))).await.unwrap();
    let after = store.snapshot().await;

    assert!(Arc::ptr_eq(&before.events, &after.events));
    assert!(!Arc::ptr_eq(
        &before.checked_in_attendees,
        &after.checked_in_attendees
    ));
    assert!(before.checked_in_attendees.is_empty());
    assert_eq!(after.checked_in_attendees.len(), 1);
}

#[tokio::test]
async fn snapshot_is_not_affected_by_later_dispatches() {
    let store = empty_store();
    let before = store.snapshot().await;

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    store.send(app_actions::set_loading(true)).await.unwrap();

    assert_eq!(before, AppState::new());
    assert_eq!(store.state(|s| s.events.len()).await, 1);
}

// ============================================================================
// Check-in log
// ============================================================================

#[tokio::test]
async fn check_in_times_never_decrease() {
    // The clock runs backwards on every read.
    let env = AppEnvironment::new(
        Arc::new(SteppingClock::new(test_epoch(), Duration::seconds(-30))),
        Arc::new(SequentialIds::default()),
    );
    let store = store_with(env);
    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();

    for n in 0..5 {
        store
            .send(app_actions::check_in_attendee(ann(&format!("c{n}"), &format!("P{n}"))))
            .await
            .unwrap();
    }

    let log = store.state(|s| Arc::clone(&s.checked_in_attendees)).await;
    assert_eq!(log.len(), 5);
    assert!(log.windows(2).all(|w| w[0].checked_in_at <= w[1].checked_in_at));
}

#[tokio::test]
async fn check_ins_survive_event_deletion() {
    let store = empty_store();
    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    store.send(app_actions::check_in_attendee(ann("c1", "P1"))).await.unwrap();

    store.send(app_actions::delete_event("e1")).await.unwrap();

    let state = store.snapshot().await;
    assert!(state.events.is_empty());
    assert_eq!(state.checked_in_attendees.len(), 1);
    assert_eq!(state.metrics_for(&EventId::from("e1")), None);
}

#[tokio::test]
async fn re_added_event_id_cannot_inherit_check_ins() {
    let store = empty_store();
    let mut tiny = demo_event("e1");
    tiny.capacity = 1;

    store.send(app_actions::add_event(tiny.clone())).await.unwrap();
    store.send(app_actions::check_in_attendee(ann("c1", "P1"))).await.unwrap();
    store.send(app_actions::delete_event("e1")).await.unwrap();

    let readded = store.send(app_actions::add_event(tiny)).await;

    assert!(matches!(
        readded,
        Err(StoreError::Rejected(AppError::EventIdRetired(ref id))) if id.as_str() == "e1"
    ));
    assert!(!store.state(|s| s.has_event(&EventId::from("e1"))).await);
}

#[tokio::test]
async fn capacity_policy_comes_from_config() {
    let config = Config {
        seed_demo: false,
        capacity_policy: CapacityPolicy::AllowOverbooking,
        ..Config::default()
    };
    let store = build_store(&config, AppEnvironment::production());

    let mut tiny = demo_event("e1");
    tiny.capacity = 1;
    store.send(app_actions::add_event(tiny)).await.unwrap();
    store.send(app_actions::check_in_attendee(ann("c1", "P1"))).await.unwrap();
    store.send(app_actions::check_in_attendee(ann("c2", "P2"))).await.unwrap();

    assert_eq!(store.state(|s| s.checked_in_attendees.len()).await, 2);
}

// ============================================================================
// Broadcast
// ============================================================================

#[tokio::test]
async fn subscribers_see_applied_actions_only() {
    let store = empty_store();
    let mut rx = store.subscribe_actions();

    store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
    let rejected = store.send(app_actions::delete_event("nope")).await;
    assert!(rejected.is_err());
    store.send(app_actions::set_loading(true)).await.unwrap();

    assert_eq!(rx.recv().await.unwrap().tag(), "ADD_EVENT");
    assert_eq!(rx.recv().await.unwrap(), AppAction::SetLoading(true));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn create_event_gets_store_assigned_id() {
    let store = empty_store();
    let draft = EventDraft {
        title: "Workshop".to_string(),
        description: String::new(),
        date: "2024-09-01".to_string(),
        time: "10:00".to_string(),
        location: "Room 1".to_string(),
        price: 0.0,
        capacity: 30,
    };

    store.send(app_actions::create_event(draft.clone())).await.unwrap();
    store.send(app_actions::create_event(draft)).await.unwrap();

    let ids: Vec<String> = store
        .state(|s| s.events.iter().map(|e| e.id.to_string()).collect())
        .await;
    assert_eq!(ids, vec!["evt-1", "evt-2"]);
}

// ============================================================================
// Wire form and provider
// ============================================================================

#[tokio::test]
async fn dispatch_json_round_trip() {
    let store = empty_store();
    let raw = serde_json::json!({
        "type": "ADD_EVENT",
        "payload": demo_event("e1"),
    })
    .to_string();

    dispatch_json(&store, &raw).await.unwrap();

    assert!(store.state(|s| s.has_event(&EventId::from("e1"))).await);
}

#[tokio::test]
async fn provider_scope_is_required() {
    assert_eq!(use_app_state().err(), Some(ProviderError::MissingProvider));

    let provider = AppProvider::new(empty_store());
    let count = provider
        .scope(async {
            let store = use_app_state().unwrap();
            store.send(app_actions::add_event(demo_event("e1"))).await.unwrap();
            store.state(|s| s.events.len()).await
        })
        .await;

    assert_eq!(count, 1);
}
