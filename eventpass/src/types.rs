//! Domain types for the EventPass store.
//!
//! Events, check-ins, the session user and the [`AppState`] that owns them.
//! Serialized field names are camelCase so the JSON shape matches what the
//! UI layer exchanges (`passCode`, `eventId`, `createdAt`, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::validation::{DATE_FORMAT, TIME_FORMAT, ValidationError};

/// Start of `date` in UTC
pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Event timestamps arrive either as RFC 3339 or as a bare `YYYY-MM-DD` date,
/// which is read as midnight UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    use crate::validation::DATE_FORMAT;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(at) = raw.parse::<DateTime<Utc>>() {
            return Ok(at);
        }
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(super::midnight_utc)
            .map_err(|_| D::Error::custom(format!("invalid timestamp {raw:?}")))
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier of an event, immutable after creation
    EventId
);

string_id!(
    /// Unique identifier of a check-in record
    AttendeeId
);

string_id!(
    /// Identifier of the session user
    UserId
);

/// Lifecycle status of an event
///
/// Any status may replace any other; no transition order is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Scheduled, not started
    #[default]
    Upcoming,
    /// Currently running
    Live,
    /// Finished
    Completed,
}

impl EventStatus {
    /// All statuses, in display order
    pub const ALL: [Self; 3] = [Self::Live, Self::Upcoming, Self::Completed];

    /// Lowercase name used on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organizer-created happening with schedule, location, pricing and capacity
///
/// Revenue and check-in rate are not stored here; `AppState::metrics_for`
/// computes them from `attendees`, `price` and the check-in log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Time of day, `HH:MM`
    pub time: String,
    /// Venue
    pub location: String,
    /// Ticket price, non-negative
    pub price: f64,
    /// Attendance ceiling
    pub capacity: u32,
    /// Registered attendees, never above `capacity`
    pub attendees: u32,
    /// Rating on a 0-5 scale
    pub rating: f64,
    /// Lifecycle status
    pub status: EventStatus,
    /// When the event was created
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// When the event was last modified
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Combined start timestamp from `date` and `time`
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDate`] or [`ValidationError::InvalidTime`]
    /// if either part does not parse.
    pub fn starts_at(&self) -> Result<NaiveDateTime, ValidationError> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;
        let time = NaiveTime::parse_from_str(&self.time, TIME_FORMAT)
            .map_err(|_| ValidationError::InvalidTime(self.time.clone()))?;
        Ok(date.and_time(time))
    }

    /// Seats still available for registration
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.attendees)
    }

    /// Revenue from registered attendees (`attendees × price`)
    #[must_use]
    pub fn revenue(&self) -> f64 {
        f64::from(self.attendees) * self.price
    }
}

/// The organizer-supplied part of a new event
///
/// The store fills in the id, timestamps, status and zeroed metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Display title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Time of day, `HH:MM`
    pub time: String,
    /// Venue
    #[serde(default)]
    pub location: String,
    /// Ticket price
    #[serde(default)]
    pub price: f64,
    /// Attendance ceiling
    pub capacity: u32,
}

impl EventDraft {
    /// Turn the draft into a fresh event
    #[must_use]
    pub fn into_event(self, id: EventId, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            price: self.price,
            capacity: self.capacity,
            attendees: 0,
            rating: 0.0,
            status: EventStatus::Upcoming,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an event
///
/// Every `Some` field replaces the event's value; `None` leaves it alone.
/// `id` and `created_at` are not patchable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// New time, `HH:MM`
    pub time: Option<String>,
    /// New venue
    pub location: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New capacity
    pub capacity: Option<u32>,
    /// New registered attendee count
    pub attendees: Option<u32>,
    /// New rating
    pub rating: Option<f64>,
    /// New status
    pub status: Option<EventStatus>,
}

impl EventPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into `event`
    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(price) = self.price {
            event.price = price;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(attendees) = self.attendees {
            event.attendees = attendees;
        }
        if let Some(rating) = self.rating {
            event.rating = rating;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the price
    #[must_use]
    pub const fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the capacity
    #[must_use]
    pub const fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the registered attendee count
    #[must_use]
    pub const fn with_attendees(mut self, attendees: u32) -> Self {
        self.attendees = Some(attendees);
        self
    }

    /// Set the rating
    #[must_use]
    pub const fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Role of the session user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Creates and runs events
    #[default]
    Organizer,
    /// Full access
    Admin,
}

/// The single active session's profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Permission level
    pub role: UserRole,
    /// Avatar image path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A credential presented at the door for a specific event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Identifier of the resulting check-in record
    pub id: AttendeeId,
    /// Display name
    pub name: String,
    /// QR payload or manually entered code
    pub pass_code: String,
    /// Event being attended
    pub event_id: EventId,
}

/// A recorded admission; entries are only ever appended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedInAttendee {
    /// Identifier
    pub id: AttendeeId,
    /// Display name
    pub name: String,
    /// Credential presented at the door
    pub pass_code: String,
    /// Back-reference to the event; lookup only
    pub event_id: EventId,
    /// Set by the store, never by the caller
    pub checked_in_at: DateTime<Utc>,
}

impl CheckedInAttendee {
    /// Record a request as admitted at `checked_in_at`
    #[must_use]
    pub fn admit(request: CheckInRequest, checked_in_at: DateTime<Utc>) -> Self {
        Self {
            id: request.id,
            name: request.name,
            pass_code: request.pass_code,
            event_id: request.event_id,
            checked_in_at,
        }
    }
}

/// The whole application state held by the store
///
/// Collections sit behind `Arc` and are modified with `Arc::make_mut`, so a
/// clone taken before a dispatch keeps sharing every collection that dispatch
/// did not touch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Session user, if signed in
    pub user: Option<User>,
    /// Events in insertion order, ids unique
    pub events: Arc<Vec<Event>>,
    /// Event shown by contextual screens (a copy of an entry in `events`)
    pub current_event: Option<Event>,
    /// Append-only check-in log in arrival order
    pub checked_in_attendees: Arc<Vec<CheckedInAttendee>>,
    /// Global busy flag
    pub is_loading: bool,
}

impl AppState {
    /// Creates an empty state with no user
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
