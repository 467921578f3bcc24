//! # EventPass Core
//!
//! Core traits for the EventPass application store.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a store
//! - **Action**: A tagged description of a requested state change
//! - **Reducer**: `(State, Action, Environment) → Result<(), Error>`
//! - **Environment**: Injected dependencies (clock, id generation)
//!
//! ## Architecture Principles
//!
//! - Unidirectional data flow: every mutation goes through a reducer
//! - Rejected actions leave state untouched and are reported as values
//! - No hidden I/O: time and identifiers come from the environment
//!
//! ## Example
//!
//! ```ignore
//! use eventpass_core::reducer::Reducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!     type Error = CounterError;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> Result<(), CounterError> {
//!         state.count = state.count.checked_add(1).ok_or(CounterError::Overflow)?;
//!         Ok(())
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Reducer module - The core trait for business logic
pub mod reducer {
    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Error`: Why an action was rejected
    ///
    /// # Contract
    ///
    /// A reducer is synchronous and validates before it mutates. When it
    /// returns `Err`, the state must be exactly what it was before the call.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The rejection type returned for actions that cannot be applied
        type Error;

        /// Apply an action to the state
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is rejected. The state is left
        /// unchanged in that case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<(), Self::Error>;
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies a reducer needs are abstracted behind traits and
/// injected via the Environment parameter, so tests can pin time and ids.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use eventpass_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh entity identifiers
    pub trait IdGenerator: Send + Sync {
        /// Produce an identifier that has not been handed out before
        fn next_id(&self) -> String;
    }

    /// Production id generator producing random v4 UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidIds;

    impl IdGenerator for UuidIds {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().to_string()
        }
    }
}
