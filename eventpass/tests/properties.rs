//! Property tests for the application reducer
//!
//! Random action sequences over a small id space, so collisions (duplicate
//! ids, re-used passes, unknown events) happen often.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::Duration;
use eventpass::{
    AppAction, AppEnvironment, AppReducer, AppState, AttendeeId, CheckInRequest, EventDraft,
    EventId, EventPatch, EventStatus,
};
use eventpass_core::reducer::Reducer;
use eventpass_testing::{SequentialIds, SteppingClock, test_epoch};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn event_id() -> impl Strategy<Value = String> {
    (1u8..=4).prop_map(|n| format!("e{n}"))
}

fn status() -> impl Strategy<Value = EventStatus> {
    prop_oneof![
        Just(EventStatus::Upcoming),
        Just(EventStatus::Live),
        Just(EventStatus::Completed),
    ]
}

fn action() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        (event_id(), 0u32..5).prop_map(|(id, capacity)| {
            let event = EventDraft {
                title: format!("Event {id}"),
                description: String::new(),
                date: "2024-07-15".to_string(),
                time: "14:00".to_string(),
                location: String::new(),
                price: 10.0,
                capacity,
            }
            .into_event(EventId::from(id), test_epoch());
            AppAction::AddEvent(event)
        }),
        event_id().prop_map(|id| AppAction::DeleteEvent(EventId::from(id))),
        (event_id(), status()).prop_map(|(id, status)| AppAction::UpdateEvent {
            id: EventId::from(id),
            updates: EventPatch::default().with_status(status),
        }),
        (event_id(), 0u32..8).prop_map(|(id, attendees)| AppAction::UpdateEvent {
            id: EventId::from(id),
            updates: EventPatch::default().with_attendees(attendees),
        }),
        (1u8..=12, 1u8..=4, event_id()).prop_map(|(n, pass, id)| {
            AppAction::CheckInAttendee(CheckInRequest {
                id: AttendeeId::from(format!("c{n}")),
                name: format!("Guest {n}"),
                pass_code: format!("P{pass}"),
                event_id: EventId::from(id),
            })
        }),
        any::<bool>().prop_map(AppAction::SetLoading),
    ]
}

fn environment() -> AppEnvironment {
    // A clock that goes backwards exercises the monotonic clamp.
    AppEnvironment::new(
        Arc::new(SteppingClock::new(test_epoch(), Duration::seconds(-1))),
        Arc::new(SequentialIds::default()),
    )
}

proptest! {
    #[test]
    fn event_ids_stay_unique(actions in prop::collection::vec(action(), 0..40)) {
        let reducer = AppReducer::new();
        let env = environment();
        let mut state = AppState::new();

        for action in actions {
            let _ = reducer.reduce(&mut state, action, &env);
            let ids: HashSet<&EventId> = state.events.iter().map(|e| &e.id).collect();
            prop_assert_eq!(ids.len(), state.events.len());
        }
    }

    #[test]
    fn check_in_log_only_grows(actions in prop::collection::vec(action(), 0..40)) {
        let reducer = AppReducer::new();
        let env = environment();
        let mut state = AppState::new();

        for action in actions {
            let before = Arc::clone(&state.checked_in_attendees);
            let _ = reducer.reduce(&mut state, action, &env);
            let after = &state.checked_in_attendees;

            prop_assert!(after.len() == before.len() || after.len() == before.len() + 1);
            prop_assert_eq!(&after[..before.len()], &before[..]);
        }

        let log = &state.checked_in_attendees;
        prop_assert!(log.windows(2).all(|w| w[0].checked_in_at <= w[1].checked_in_at));
    }

    #[test]
    fn rejected_actions_change_nothing(actions in prop::collection::vec(action(), 0..40)) {
        let reducer = AppReducer::new();
        let env = environment();
        let mut state = AppState::new();

        for action in actions {
            let before = state.clone();
            if reducer.reduce(&mut state, action, &env).is_err() {
                prop_assert_eq!(&state, &before);
                prop_assert!(Arc::ptr_eq(&state.events, &before.events));
                prop_assert!(Arc::ptr_eq(
                    &state.checked_in_attendees,
                    &before.checked_in_attendees
                ));
            }
        }
    }

    #[test]
    fn registrations_never_exceed_capacity(actions in prop::collection::vec(action(), 0..40)) {
        let reducer = AppReducer::new();
        let env = environment();
        let mut state = AppState::new();

        for action in actions {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        for event in state.events.iter() {
            prop_assert!(event.attendees <= event.capacity);
        }
    }
}
