//! Demo session data.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use crate::types::{AppState, Event, EventId, EventStatus, User, UserId, UserRole, midnight_utc};

fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(midnight_utc)
        .unwrap_or_default()
}

/// The organizer signed in to the demo session
#[must_use]
pub fn demo_user() -> User {
    User {
        id: UserId::from("1"),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        role: UserRole::Organizer,
        avatar: Some("/avatar.jpg".to_string()),
    }
}

/// The events the demo session starts with
#[must_use]
pub fn demo_events() -> Vec<Event> {
    vec![
        Event {
            id: EventId::from("1"),
            title: "Tech Conference 2024".to_string(),
            description: "Annual technology conference".to_string(),
            date: "2024-07-15".to_string(),
            time: "14:00".to_string(),
            location: "Convention Center".to_string(),
            price: 99.0,
            capacity: 500,
            attendees: 127,
            rating: 4.8,
            status: EventStatus::Upcoming,
            created_at: midnight(2024, 1, 1),
            updated_at: midnight(2024, 1, 1),
        },
        Event {
            id: EventId::from("2"),
            title: "Business Summit".to_string(),
            description: "Leadership and innovation summit".to_string(),
            date: "2024-07-20".to_string(),
            time: "09:00".to_string(),
            location: "Business Center".to_string(),
            price: 149.0,
            capacity: 300,
            attendees: 89,
            rating: 4.5,
            status: EventStatus::Live,
            created_at: midnight(2024, 1, 2),
            updated_at: midnight(2024, 1, 2),
        },
    ]
}

impl AppState {
    /// State of a freshly opened demo session
    ///
    /// Signed in as [`demo_user`], two events, an empty check-in log.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            user: Some(demo_user()),
            events: Arc::new(demo_events()),
            ..Self::default()
        }
    }
}
