//! Scoped access to the application store.
//!
//! UI-side code runs inside [`AppProvider::scope`] and reaches the store with
//! [`use_app_state`] instead of threading a handle through every call. The
//! binding is a tokio task-local, so it follows the scoped future but is not
//! inherited by tasks spawned from it; pass those an explicit [`AppStore`].

use std::future::Future;

use eventpass_runtime::StoreError;
use thiserror::Error;

use crate::error::AppError;
use crate::store::AppStore;

tokio::task_local! {
    static APP_STORE: AppStore;
}

/// Store access outside of any provider scope
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    /// [`use_app_state`] was called outside [`AppProvider::scope`]
    #[error("use_app_state must be called within an AppProvider scope")]
    MissingProvider,
}

/// Binds a store to the futures it scopes
#[derive(Clone)]
pub struct AppProvider {
    store: AppStore,
}

impl AppProvider {
    /// Creates a provider for `store`
    #[must_use]
    pub const fn new(store: AppStore) -> Self {
        Self { store }
    }

    /// The provided store
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Run `fut` with the store reachable through [`use_app_state`]
    ///
    /// Scopes nest; the innermost provider wins.
    pub async fn scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        APP_STORE.scope(self.store.clone(), fut).await
    }

    /// Run `fut` in scope, then shut the store down
    ///
    /// Models the application mounting and unmounting: once `fut` finishes,
    /// further dispatches are refused and a dispatch still running gets the
    /// configured shutdown timeout to finish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the state lock is still held
    /// after the timeout. The output of `fut` is dropped in that case.
    pub async fn mount<F>(self, fut: F) -> Result<F::Output, StoreError<AppError>>
    where
        F: Future,
    {
        let output = self.scope(fut).await;
        tracing::debug!("Unmounting provider");
        self.store.close().await?;
        Ok(output)
    }
}

impl std::fmt::Debug for AppProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppProvider").finish_non_exhaustive()
    }
}

/// The store of the enclosing [`AppProvider`] scope
///
/// # Errors
///
/// Returns [`ProviderError::MissingProvider`] when called outside any scope.
/// This is a wiring mistake; callers should propagate it and abort rather
/// than fall back to a default store.
pub fn use_app_state() -> Result<AppStore, ProviderError> {
    APP_STORE
        .try_with(AppStore::clone)
        .map_err(|_| ProviderError::MissingProvider)
}
