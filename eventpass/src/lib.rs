//! # EventPass
//!
//! Client-side application state for EventPass: the events an organizer runs,
//! the attendees checked in at the door, and the store every screen reads from.
//!
//! ## Architecture
//!
//! - **State**: [`AppState`] holds the session user, events, the current event,
//!   the append-only check-in log and a global loading flag
//! - **Actions**: [`AppAction`] is the closed vocabulary of changes, built with
//!   the [`app_actions`] creators or decoded from tagged JSON
//! - **Reducer**: [`AppReducer`] validates each action before applying it; a
//!   rejected action returns an [`AppError`] and leaves the state untouched
//! - **Store**: [`AppStore`] serializes dispatches and broadcasts applied
//!   actions so subscribers can re-render
//! - **Provider**: [`AppProvider`] scopes a store to a subtree of futures,
//!   reached with [`use_app_state`]
//!
//! ## Example
//!
//! ```ignore
//! use eventpass::{AppEnvironment, AppProvider, Config, app_actions, build_store, use_app_state};
//!
//! let store = build_store(&Config::from_env()?, AppEnvironment::production());
//!
//! AppProvider::new(store)
//!     .mount(async {
//!         let store = use_app_state()?;
//!         store.send(app_actions::set_loading(true)).await?;
//!         Ok::<_, anyhow::Error>(())
//!     })
//!     .await??;
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod provider;
pub mod queries;
pub mod reducer;
pub mod seed;
pub mod store;
pub mod types;
pub mod validation;

pub use actions::{AppAction, app_actions};
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use provider::{AppProvider, ProviderError, use_app_state};
pub use queries::{DashboardTotals, EventMetrics, StatusCounts, StatusFilter};
pub use reducer::{AppEnvironment, AppReducer, CapacityPolicy};
pub use store::{AppStore, build_store, dispatch_json};
pub use types::{
    AppState, AttendeeId, CheckInRequest, CheckedInAttendee, Event, EventDraft, EventId,
    EventPatch, EventStatus, User, UserId, UserRole,
};
pub use validation::ValidationError;

pub use eventpass_runtime::StoreError;
