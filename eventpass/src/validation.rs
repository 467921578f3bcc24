//! Event invariants.
//!
//! Every event that enters the store (added, created or patched) passes
//! through [`validate_event`] first.

use thiserror::Error;

use crate::types::Event;

/// Format of [`Event::date`]
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of [`Event::time`]
pub const TIME_FORMAT: &str = "%H:%M";

/// Highest allowed rating
pub const MAX_RATING: f64 = 5.0;

/// A broken event invariant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Title is empty or whitespace
    #[error("event title cannot be empty")]
    BlankTitle,

    /// Date is not `YYYY-MM-DD`
    #[error("invalid event date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Time is not `HH:MM`
    #[error("invalid event time {0:?} (expected HH:MM)")]
    InvalidTime(String),

    /// Price is negative or not a number
    #[error("price must be a non-negative amount, got {0}")]
    InvalidPrice(f64),

    /// Rating outside 0-5
    #[error("rating must be between 0 and 5, got {0}")]
    RatingOutOfRange(f64),

    /// More registered attendees than seats
    #[error("{attendees} attendees exceed capacity of {capacity}")]
    OverCapacity {
        /// Registered attendees
        attendees: u32,
        /// Seats available
        capacity: u32,
    },
}

/// Check every invariant of an event
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_event(event: &Event) -> Result<(), ValidationError> {
    if event.title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }

    event.starts_at()?;

    if !event.price.is_finite() || event.price < 0.0 {
        return Err(ValidationError::InvalidPrice(event.price));
    }

    // NaN fails `contains`, so it is rejected here too.
    if !(0.0..=MAX_RATING).contains(&event.rating) {
        return Err(ValidationError::RatingOutOfRange(event.rating));
    }

    if event.attendees > event.capacity {
        return Err(ValidationError::OverCapacity {
            attendees: event.attendees,
            capacity: event.capacity,
        });
    }

    Ok(())
}
