//! The closed set of state changes the store accepts.
//!
//! On the wire an action is `{"type": "ADD_EVENT", "payload": ...}`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::{CheckInRequest, Event, EventDraft, EventId, EventPatch, EventStatus, User};

/// Every mutation of [`AppState`](crate::AppState) is one of these
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppAction {
    /// Toggle the global busy flag
    SetLoading(bool),

    /// Replace the session user wholesale
    SetUser(Option<User>),

    /// Append a fully-formed event whose id the caller chose
    AddEvent(Event),

    /// Create an event; the store assigns id and timestamps
    CreateEvent(EventDraft),

    /// Merge a partial update into an existing event
    UpdateEvent {
        /// Event to update
        id: EventId,
        /// Fields to replace
        updates: EventPatch,
    },

    /// Move an event to another status
    SetEventStatus {
        /// Event to update
        id: EventId,
        /// New status
        status: EventStatus,
    },

    /// Remove an event
    DeleteEvent(EventId),

    /// Point contextual screens at an event, or clear the pointer
    SetCurrentEvent(Option<Event>),

    /// Admit a pass to an event
    CheckInAttendee(CheckInRequest),
}

impl AppAction {
    /// Every wire tag, in declaration order
    pub const TAGS: [&'static str; 9] = [
        "SET_LOADING",
        "SET_USER",
        "ADD_EVENT",
        "CREATE_EVENT",
        "UPDATE_EVENT",
        "SET_EVENT_STATUS",
        "DELETE_EVENT",
        "SET_CURRENT_EVENT",
        "CHECK_IN_ATTENDEE",
    ];

    /// The wire tag of this action
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::SetLoading(_) => "SET_LOADING",
            Self::SetUser(_) => "SET_USER",
            Self::AddEvent(_) => "ADD_EVENT",
            Self::CreateEvent(_) => "CREATE_EVENT",
            Self::UpdateEvent { .. } => "UPDATE_EVENT",
            Self::SetEventStatus { .. } => "SET_EVENT_STATUS",
            Self::DeleteEvent(_) => "DELETE_EVENT",
            Self::SetCurrentEvent(_) => "SET_CURRENT_EVENT",
            Self::CheckInAttendee(_) => "CHECK_IN_ATTENDEE",
        }
    }

    /// Decode an action from its tagged JSON form
    ///
    /// # Errors
    ///
    /// - [`AppError::UnknownAction`] if the tag is not in [`AppAction::TAGS`]
    /// - [`AppError::MalformedAction`] if the JSON or the payload does not decode
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| AppError::MalformedAction(e.to_string()))?;

        let Some(tag) = value.get("type").and_then(serde_json::Value::as_str) else {
            return Err(AppError::MalformedAction(
                "missing \"type\" tag".to_string(),
            ));
        };

        if !Self::TAGS.contains(&tag) {
            return Err(AppError::UnknownAction {
                tag: tag.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| AppError::MalformedAction(e.to_string()))
    }
}

/// Action creators
///
/// Thin constructors so call sites read as intent ("check in this pass")
/// rather than as enum plumbing.
pub mod app_actions {
    use super::{AppAction, CheckInRequest, Event, EventDraft, EventId, EventPatch, EventStatus, User};

    /// [`AppAction::SetLoading`]
    #[must_use]
    pub const fn set_loading(loading: bool) -> AppAction {
        AppAction::SetLoading(loading)
    }

    /// [`AppAction::SetUser`]
    #[must_use]
    pub const fn set_user(user: Option<User>) -> AppAction {
        AppAction::SetUser(user)
    }

    /// [`AppAction::AddEvent`]
    #[must_use]
    pub const fn add_event(event: Event) -> AppAction {
        AppAction::AddEvent(event)
    }

    /// [`AppAction::CreateEvent`]
    #[must_use]
    pub const fn create_event(draft: EventDraft) -> AppAction {
        AppAction::CreateEvent(draft)
    }

    /// [`AppAction::UpdateEvent`]
    #[must_use]
    pub fn update_event(id: impl Into<EventId>, updates: EventPatch) -> AppAction {
        AppAction::UpdateEvent {
            id: id.into(),
            updates,
        }
    }

    /// [`AppAction::SetEventStatus`]
    #[must_use]
    pub fn set_event_status(id: impl Into<EventId>, status: EventStatus) -> AppAction {
        AppAction::SetEventStatus {
            id: id.into(),
            status,
        }
    }

    /// [`AppAction::DeleteEvent`]
    #[must_use]
    pub fn delete_event(id: impl Into<EventId>) -> AppAction {
        AppAction::DeleteEvent(id.into())
    }

    /// [`AppAction::SetCurrentEvent`]
    #[must_use]
    pub const fn set_current_event(event: Option<Event>) -> AppAction {
        AppAction::SetCurrentEvent(event)
    }

    /// [`AppAction::CheckInAttendee`]
    #[must_use]
    pub const fn check_in_attendee(request: CheckInRequest) -> AppAction {
        AppAction::CheckInAttendee(request)
    }
}
