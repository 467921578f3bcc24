//! Why the store refused an action.

use thiserror::Error;

use crate::types::{AttendeeId, EventId};
use crate::validation::ValidationError;

/// Rejection returned by [`AppReducer`](crate::AppReducer)
///
/// A rejected action never changes state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// No event with this id
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// An event with this id already exists
    #[error("event {0} already exists")]
    DuplicateEvent(EventId),

    /// The id belonged to a deleted event whose check-ins are still logged
    #[error("event id {0} still has check-ins from a deleted event")]
    EventIdRetired(EventId),

    /// A check-in with this id was already recorded
    #[error("check-in {0} already recorded")]
    DuplicateCheckIn(AttendeeId),

    /// The pass was already admitted to this event
    #[error("pass {pass_code:?} already checked in to event {event_id}")]
    PassAlreadyUsed {
        /// Presented credential
        pass_code: String,
        /// Event it was presented for
        event_id: EventId,
    },

    /// The pass code is empty or whitespace
    #[error("pass code cannot be empty")]
    BlankPassCode,

    /// Every seat of the event is already checked in
    #[error("event {event_id} is at capacity ({capacity} checked in)")]
    CapacityReached {
        /// Full event
        event_id: EventId,
        /// Its capacity
        capacity: u32,
    },

    /// The event would break an invariant
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] ValidationError),

    /// The action tag is not part of the vocabulary
    #[error("unknown action type {tag:?}")]
    UnknownAction {
        /// Tag as received
        tag: String,
    },

    /// The action could not be decoded
    #[error("malformed action: {0}")]
    MalformedAction(String),
}

impl AppError {
    /// Whether the action referred to an event that does not exist
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_))
    }

    /// Whether the action indicates a mismatch between caller and vocabulary
    ///
    /// These are programmer errors rather than user input problems.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(self, Self::UnknownAction { .. } | Self::MalformedAction(_))
    }
}
