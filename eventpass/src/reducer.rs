//! Reducer logic for the application state.
//!
//! Every action is validated against the current state first; only then is
//! the touched collection copied (`Arc::make_mut`) and modified. A rejected
//! action leaves the state exactly as it was.

use std::str::FromStr;
use std::sync::Arc;

use eventpass_core::{
    environment::{Clock, IdGenerator, SystemClock, UuidIds},
    reducer::Reducer,
};
use serde::{Deserialize, Serialize};

use crate::actions::AppAction;
use crate::error::AppError;
use crate::types::{AppState, CheckInRequest, CheckedInAttendee, Event, EventDraft, EventId};
use crate::validation::validate_event;

/// What to do with a check-in once every seat is taken
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityPolicy {
    /// Refuse the check-in with [`AppError::CapacityReached`]
    #[default]
    Reject,
    /// Record it anyway and log a warning
    AllowOverbooking,
}

impl FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "allow-overbooking" | "allow_overbooking" | "overbook" => Ok(Self::AllowOverbooking),
            other => Err(format!(
                "unknown capacity policy {other:?} (expected reject or allow-overbooking)"
            )),
        }
    }
}

/// Environment dependencies for the application reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Clock for event timestamps and check-in times
    pub clock: Arc<dyn Clock>,
    /// Source of ids for store-created events
    pub ids: Arc<dyn IdGenerator>,
    /// Check-in behaviour at capacity
    pub capacity_policy: CapacityPolicy,
}

impl AppEnvironment {
    /// Creates a new `AppEnvironment` with the default capacity policy
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            capacity_policy: CapacityPolicy::default(),
        }
    }

    /// System clock and random UUIDs
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidIds))
    }

    /// Replace the capacity policy
    #[must_use]
    pub const fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment")
            .field("capacity_policy", &self.capacity_policy)
            .finish_non_exhaustive()
    }
}

/// Reducer for the application state
#[derive(Clone, Debug, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn find_event(state: &AppState, id: &EventId) -> Result<usize, AppError> {
        state
            .event_index(id)
            .ok_or_else(|| AppError::EventNotFound(id.clone()))
    }

    fn insert_event(state: &mut AppState, event: Event) -> Result<(), AppError> {
        validate_event(&event)?;
        if state.has_event(&event.id) {
            return Err(AppError::DuplicateEvent(event.id));
        }
        // Check-ins are matched by event id; a new event must not inherit them.
        if state
            .checked_in_attendees
            .iter()
            .any(|entry| entry.event_id == event.id)
        {
            return Err(AppError::EventIdRetired(event.id));
        }
        Arc::make_mut(&mut state.events).push(event);
        Ok(())
    }

    fn create_event(state: &mut AppState, draft: EventDraft, env: &AppEnvironment) -> Result<(), AppError> {
        let id = EventId::new(env.ids.next_id());
        let event = draft.into_event(id, env.clock.now());
        tracing::debug!(event_id = %event.id, "Assigned id to new event");
        Self::insert_event(state, event)
    }

    /// Validate `candidate`, then swap it in at `index`
    fn replace_event(
        state: &mut AppState,
        index: usize,
        mut candidate: Event,
        env: &AppEnvironment,
    ) -> Result<(), AppError> {
        validate_event(&candidate)?;
        candidate.updated_at = env.clock.now();

        if state
            .current_event
            .as_ref()
            .is_some_and(|current| current.id == candidate.id)
        {
            state.current_event = Some(candidate.clone());
        }
        Arc::make_mut(&mut state.events)[index] = candidate;
        Ok(())
    }

    fn delete_event(state: &mut AppState, id: &EventId) -> Result<(), AppError> {
        let index = Self::find_event(state, id)?;
        Arc::make_mut(&mut state.events).remove(index);

        if state
            .current_event
            .as_ref()
            .is_some_and(|current| &current.id == id)
        {
            state.current_event = None;
        }
        Ok(())
    }

    fn set_current_event(state: &mut AppState, event: Option<Event>) -> Result<(), AppError> {
        state.current_event = match event {
            // Keep the stored copy so the pointer never diverges from `events`.
            Some(event) => Some(state.events[Self::find_event(state, &event.id)?].clone()),
            None => None,
        };
        Ok(())
    }

    fn check_in(state: &mut AppState, request: CheckInRequest, env: &AppEnvironment) -> Result<(), AppError> {
        if request.pass_code.trim().is_empty() {
            return Err(AppError::BlankPassCode);
        }

        let event = &state.events[Self::find_event(state, &request.event_id)?];

        let log = &state.checked_in_attendees;
        if log.iter().any(|entry| entry.id == request.id) {
            return Err(AppError::DuplicateCheckIn(request.id));
        }
        if log
            .iter()
            .any(|entry| entry.event_id == request.event_id && entry.pass_code == request.pass_code)
        {
            return Err(AppError::PassAlreadyUsed {
                pass_code: request.pass_code,
                event_id: request.event_id,
            });
        }

        let admitted = log.iter().filter(|entry| entry.event_id == event.id).count();
        if admitted >= event.capacity as usize {
            match env.capacity_policy {
                CapacityPolicy::Reject => {
                    return Err(AppError::CapacityReached {
                        event_id: event.id.clone(),
                        capacity: event.capacity,
                    });
                },
                CapacityPolicy::AllowOverbooking => {
                    tracing::warn!(
                        event_id = %event.id,
                        capacity = event.capacity,
                        admitted,
                        "Overbooking: check-in beyond capacity"
                    );
                },
            }
        }

        // Never go back in time, even if the wall clock does.
        let now = env.clock.now();
        let checked_in_at = log
            .last()
            .map_or(now, |last| now.max(last.checked_in_at));

        Arc::make_mut(&mut state.checked_in_attendees)
            .push(CheckedInAttendee::admit(request, checked_in_at));
        Ok(())
    }

    fn apply(state: &mut AppState, action: AppAction, env: &AppEnvironment) -> Result<(), AppError> {
        match action {
            AppAction::SetLoading(loading) => {
                state.is_loading = loading;
                Ok(())
            },
            AppAction::SetUser(user) => {
                state.user = user;
                Ok(())
            },
            AppAction::AddEvent(event) => Self::insert_event(state, event),
            AppAction::CreateEvent(draft) => Self::create_event(state, draft, env),
            AppAction::UpdateEvent { id, updates } => {
                let index = Self::find_event(state, &id)?;
                if updates.is_empty() {
                    return Ok(());
                }
                let mut candidate = state.events[index].clone();
                updates.apply_to(&mut candidate);
                Self::replace_event(state, index, candidate, env)
            },
            AppAction::SetEventStatus { id, status } => {
                let index = Self::find_event(state, &id)?;
                let mut candidate = state.events[index].clone();
                candidate.status = status;
                Self::replace_event(state, index, candidate, env)
            },
            AppAction::DeleteEvent(id) => Self::delete_event(state, &id),
            AppAction::SetCurrentEvent(event) => Self::set_current_event(state, event),
            AppAction::CheckInAttendee(request) => Self::check_in(state, request, env),
        }
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;
    type Error = AppError;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Result<(), Self::Error> {
        let tag = action.tag();

        match Self::apply(state, action, env) {
            Ok(()) => {
                tracing::debug!(action = tag, "Applied action");
                Ok(())
            },
            Err(error) => {
                tracing::warn!(action = tag, %error, "Rejected action");
                Err(error)
            },
        }
    }
}
