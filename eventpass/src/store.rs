//! The concrete store for [`AppState`].

use eventpass_runtime::{Store, StoreError};

use crate::actions::AppAction;
use crate::config::Config;
use crate::error::AppError;
use crate::reducer::{AppEnvironment, AppReducer};
use crate::types::AppState;

/// Store holding the application state
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Build a store from configuration
///
/// The capacity policy from `config` overrides the one on `env`. The store
/// starts from [`AppState::demo`] when `seed_demo` is set, otherwise empty.
#[must_use]
pub fn build_store(config: &Config, env: AppEnvironment) -> AppStore {
    let env = env.with_capacity_policy(config.capacity_policy);
    let initial = if config.seed_demo {
        AppState::demo()
    } else {
        AppState::new()
    };

    tracing::info!(
        seed_demo = config.seed_demo,
        capacity_policy = ?config.capacity_policy,
        events = initial.events.len(),
        "Building application store"
    );

    Store::with_config(initial, AppReducer::new(), env, config.store_config())
}

/// Dispatch an action given in its tagged JSON form
///
/// ```ignore
/// dispatch_json(&store, r#"{"type":"SET_LOADING","payload":true}"#).await?;
/// ```
///
/// # Errors
///
/// - [`StoreError::Rejected`] with [`AppError::UnknownAction`] or
///   [`AppError::MalformedAction`] if the payload does not decode. These are
///   logged at error level.
/// - Any error [`Store::send`] returns.
pub async fn dispatch_json(store: &AppStore, raw: &str) -> Result<(), StoreError<AppError>> {
    let action = AppAction::from_json(raw).map_err(|error| {
        if error.is_programmer_error() {
            tracing::error!(%error, "Dropped undecodable action");
        }
        StoreError::Rejected(error)
    })?;

    store.send(action).await
}
