//! Read-side projections over [`AppState`].
//!
//! Dashboard figures (revenue, check-in rate, status counts) are computed here
//! on demand instead of being stored on events, so they cannot drift from the
//! data they summarize.

use serde::Serialize;

use crate::types::{AppState, CheckedInAttendee, Event, EventId, EventStatus};

/// Status filter for [`AppState::search_events`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Any status
    #[default]
    All,
    /// Only events with this status
    Only(EventStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter
    #[must_use]
    pub fn matches(self, status: EventStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Number of events per status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Every event
    pub all: usize,
    /// Live events
    pub live: usize,
    /// Upcoming events
    pub upcoming: usize,
    /// Completed events
    pub completed: usize,
}

/// Per-event figures shown on the event detail screen
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    /// Event these figures belong to
    pub event_id: EventId,
    /// Registered attendees
    pub attendees: u32,
    /// Entries in the check-in log for this event
    pub checked_in: usize,
    /// `attendees × price`
    pub revenue: f64,
    /// `checked_in / attendees` as a percentage, capped at 100
    pub checkin_rate: f64,
}

/// Aggregates across all events
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// Sum of event revenue
    pub total_revenue: f64,
    /// Sum of registered attendees
    pub total_attendees: u64,
    /// Mean rating, 0 without events
    pub average_rating: f64,
    /// Mean check-in rate, 0 without events
    pub average_checkin_rate: f64,
}

#[allow(clippy::cast_precision_loss)]
fn checkin_rate(checked_in: usize, attendees: u32) -> f64 {
    if attendees == 0 {
        return 0.0;
    }
    (checked_in as f64 / f64::from(attendees) * 100.0).min(100.0)
}

impl AppState {
    /// Position of the event with `id` in `events`
    pub(crate) fn event_index(&self, id: &EventId) -> Option<usize> {
        self.events.iter().position(|event| &event.id == id)
    }

    /// The event with `id`, if any
    #[must_use]
    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.event_index(id).map(|index| &self.events[index])
    }

    /// Whether an event with `id` exists
    #[must_use]
    pub fn has_event(&self, id: &EventId) -> bool {
        self.event_index(id).is_some()
    }

    /// Events whose title contains `term` (case-insensitive) and whose status passes `filter`
    ///
    /// An empty term matches every title.
    #[must_use]
    pub fn search_events(&self, term: &str, filter: StatusFilter) -> Vec<&Event> {
        let needle = term.trim().to_lowercase();
        self.events
            .iter()
            .filter(|event| filter.matches(event.status))
            .filter(|event| needle.is_empty() || event.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Count events per status
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        self.events
            .iter()
            .fold(StatusCounts::default(), |mut counts, event| {
                counts.all += 1;
                match event.status {
                    EventStatus::Live => counts.live += 1,
                    EventStatus::Upcoming => counts.upcoming += 1,
                    EventStatus::Completed => counts.completed += 1,
                }
                counts
            })
    }

    /// The last `n` check-ins, newest first
    #[must_use]
    pub fn recent_check_ins(&self, n: usize) -> Vec<&CheckedInAttendee> {
        self.checked_in_attendees.iter().rev().take(n).collect()
    }

    /// Check-ins whose attendee name or pass code contains `term` (case-insensitive)
    ///
    /// An empty term matches the whole log. Results keep arrival order.
    #[must_use]
    pub fn search_check_ins(&self, term: &str) -> Vec<&CheckedInAttendee> {
        let needle = term.trim().to_lowercase();
        self.checked_in_attendees
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.name.to_lowercase().contains(&needle)
                    || entry.pass_code.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Check-ins recorded for one event, in arrival order
    #[must_use]
    pub fn check_ins_for(&self, event_id: &EventId) -> Vec<&CheckedInAttendee> {
        self.checked_in_attendees
            .iter()
            .filter(|entry| &entry.event_id == event_id)
            .collect()
    }

    /// Number of check-ins recorded for one event
    #[must_use]
    pub fn checked_in_count(&self, event_id: &EventId) -> usize {
        self.checked_in_attendees
            .iter()
            .filter(|entry| &entry.event_id == event_id)
            .count()
    }

    /// Revenue and check-in figures for one event
    #[must_use]
    pub fn metrics_for(&self, event_id: &EventId) -> Option<EventMetrics> {
        let event = self.event(event_id)?;
        let checked_in = self.checked_in_count(event_id);

        Some(EventMetrics {
            event_id: event.id.clone(),
            attendees: event.attendees,
            checked_in,
            revenue: event.revenue(),
            checkin_rate: checkin_rate(checked_in, event.attendees),
        })
    }

    /// Totals across every event
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dashboard_totals(&self) -> DashboardTotals {
        if self.events.is_empty() {
            return DashboardTotals::default();
        }

        let count = self.events.len() as f64;
        let mut totals = DashboardTotals::default();
        let mut rating_sum = 0.0;
        let mut rate_sum = 0.0;

        for event in self.events.iter() {
            totals.total_revenue += event.revenue();
            totals.total_attendees += u64::from(event.attendees);
            rating_sum += event.rating;
            rate_sum += checkin_rate(self.checked_in_count(&event.id), event.attendees);
        }

        totals.average_rating = rating_sum / count;
        totals.average_checkin_rate = rate_sum / count;
        totals
    }
}
