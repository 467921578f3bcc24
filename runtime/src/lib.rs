//! # EventPass Runtime
//!
//! The Store runtime that coordinates reducer execution.
//!
//! ## Core Components
//!
//! - **Store**: Holds the single state instance and serializes every dispatch
//! - **Action Broadcast**: Lets observers re-read state after each applied action
//! - **Shutdown**: Refuses dispatches once the owning application unmounts
//!
//! ## Example
//!
//! ```ignore
//! use eventpass_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use eventpass_core::reducer::Reducer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// `E` is the reducer's rejection type.
    #[derive(Error, Debug)]
    pub enum StoreError<E> {
        /// The reducer rejected the action; state is unchanged
        #[error("Action rejected: {0}")]
        Rejected(E),

        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated,
        /// or when a dispatch was still waiting for the state lock at that moment.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for the in-flight dispatch or readers
        #[error("Shutdown timed out waiting for the state lock")]
        ShutdownTimeout,
    }

    impl<E> StoreError<E> {
        /// The reducer's rejection, if this error is one
        #[must_use]
        pub const fn rejection(&self) -> Option<&E> {
            match self {
                Self::Rejected(error) => Some(error),
                Self::ShutdownInProgress | Self::ShutdownTimeout => None,
            }
        }
    }
}

pub use error::StoreError;

/// Store configuration
///
/// # Example
///
/// ```
/// use eventpass_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(10));
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of applied actions buffered for slow observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, AtomicBool, Duration, Ordering, Reducer, RwLock, StoreConfig, StoreError};
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the write lock serializes every dispatch)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Broadcast of applied actions
    ///
    /// Cloning a `Store` yields another handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        default_shutdown_timeout: Duration,
        /// Every action the reducer accepted, in application order.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        R::Error: std::fmt::Display,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                default_shutdown_timeout: config.default_shutdown_timeout,
                action_broadcast,
            }
        }

        /// The environment injected into the reducer
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Whether shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag, then takes the state lock once. When this
        /// returns `Ok`, the dispatch that was running has finished and every
        /// dispatch still queued on the lock will be refused.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the lock is not acquired
        /// within `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError<R::Error>> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            if let Ok(_guard) = tokio::time::timeout(timeout, self.state.write()).await {
                tracing::info!("No dispatch in flight, shutdown successful");
                Ok(())
            } else {
                tracing::error!(?timeout, "Shutdown timeout: state lock still held");
                metrics::counter!("store.shutdown.timeout").increment(1);
                Err(StoreError::ShutdownTimeout)
            }
        }

        /// Shut down using the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn close(&self) -> Result<(), StoreError<R::Error>> {
            self.shutdown(self.default_shutdown_timeout).await
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state (dispatches never interleave)
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Broadcasts the accepted action to observers
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`] if the store is shutting down,
        ///   including when shutdown began while this call waited for the lock.
        /// - [`StoreError::Rejected`] if the reducer rejected the action. The
        ///   state is unchanged and nothing is broadcast.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError<R::Error>> {
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.actions.total").increment(1);

            let mut state = self.state.write().await;

            if self.is_shutting_down() {
                tracing::warn!("Rejected action: shutdown began while waiting for the lock");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let start = std::time::Instant::now();
            let result = self
                .reducer
                .reduce(&mut *state, action.clone(), &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            match result {
                Ok(()) => {
                    // Broadcast while still holding the lock so observers
                    // see actions in application order.
                    let _ = self.action_broadcast.send(action);
                    Ok(())
                },
                Err(error) => {
                    tracing::debug!(%error, "Reducer rejected action");
                    metrics::counter!("store.actions.rejected").increment(1);
                    Err(StoreError::Rejected(error))
                },
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let event_count = store.state(|s| s.events.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Clone the current state
        ///
        /// Cheap when the state keeps its collections behind `Arc`.
        pub async fn snapshot(&self) -> S
        where
            S: Clone,
        {
            self.state.read().await.clone()
        }

        /// Subscribe to every action the reducer accepts
        ///
        /// Rejected actions are not broadcast. Slow receivers may observe
        /// `RecvError::Lagged` and should re-read state.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                default_shutdown_timeout: self.default_shutdown_timeout,
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        Fail,
        /// Holds the write lock for a while
        Slow,
    }

    #[derive(Debug, Clone)]
    struct TestEnv {
        slow_for: Duration,
    }

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;
        type Error = String;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<(), Self::Error> {
            match action {
                TestAction::Increment => state.value += 1,
                TestAction::Decrement => state.value -= 1,
                TestAction::Fail => return Err("refused".to_string()),
                TestAction::Slow => {
                    std::thread::sleep(env.slow_for);
                    state.value += 100;
                },
            }
            Ok(())
        }
    }

    fn test_store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        let env = TestEnv {
            slow_for: Duration::from_millis(200),
        };
        Store::new(TestState { value: 0 }, TestReducer, env)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = test_store();
        assert_eq!(store.state(|s| s.value).await, 0);
        assert_eq!(store.environment().slow_for, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_multiple_actions() {
        let store = test_store();

        let _ = store.send(TestAction::Increment).await;
        let _ = store.send(TestAction::Increment).await;
        let _ = store.send(TestAction::Decrement).await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_rejection_is_returned_and_not_broadcast() {
        let store = test_store();
        let mut rx = store.subscribe_actions();

        let result = store.send(TestAction::Fail).await;
        assert!(matches!(result, Err(StoreError::Rejected(ref e)) if e == "refused"));

        let _ = store.send(TestAction::Increment).await;
        assert_eq!(rx.recv().await.ok(), Some(TestAction::Increment));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = test_store();
        let other = store.clone();

        let _ = other.send(TestAction::Increment).await;

        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.snapshot().await.value, 1);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = test_store();

        assert!(store.shutdown(Duration::from_secs(1)).await.is_ok());
        assert!(store.is_shutting_down());

        let result = store.send(TestAction::Increment).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_queued_behind_shutdown_is_refused() {
        let store = test_store();

        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.send(TestAction::Slow).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Passes the first shutdown check, then waits for the lock.
        let queued = tokio::spawn({
            let store = store.clone();
            async move { store.send(TestAction::Increment).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.shutdown(Duration::from_secs(2)).await.is_ok());

        assert!(matches!(slow.await, Ok(Ok(()))));
        assert!(matches!(queued.await, Ok(Err(StoreError::ShutdownInProgress))));
        assert_eq!(store.state(|s| s.value).await, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_times_out_while_dispatch_runs() {
        let store = test_store();

        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.send(TestAction::Slow).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        let result = store.shutdown(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(StoreError::ShutdownTimeout)));
        assert!(matches!(slow.await, Ok(Ok(()))));
    }

    #[test]
    fn test_rejection_accessor() {
        let error: StoreError<String> = StoreError::Rejected("nope".to_string());
        assert_eq!(error.rejection().map(String::as_str), Some("nope"));
        assert!(StoreError::<String>::ShutdownInProgress.rejection().is_none());
    }
}
