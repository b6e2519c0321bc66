//! # Feastflow Core
//!
//! Core traits and types for Feastflow wizards.
//!
//! Every wizard in the workspace (event booking, event creation, the smart
//! prompt assistant) is written as a reducer over explicit state. This crate
//! holds the shared vocabulary:
//!
//! - **State**: Owned, `Clone`-able domain state for one wizard session
//! - **Action**: All possible inputs (field edits, navigation intents, results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (clock, text generator)
//!
//! ## Example
//!
//! ```ignore
//! use feastflow_core::*;
//!
//! impl Reducer for BookingReducer {
//!     type State = BookingState;
//!     type Action = BookingAction;
//!     type Environment = BookingEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BookingState,
//!         action: BookingAction,
//!         env: &BookingEnvironment,
//!     ) -> SmallVec<[Effect<BookingAction>; 4]> {
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Text generation collaborator types
pub mod generation;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all wizard logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CreateEventReducer {
    ///     type State = CreateEventState;
    ///     type Action = CreateEventAction;
    ///     type Environment = CreateEventEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CreateEventState,
    ///         action: CreateEventAction,
    ///         env: &CreateEventEnvironment,
    ///     ) -> SmallVec<[Effect<CreateEventAction>; 4]> {
    ///         match action {
    ///             CreateEventAction::Next { .. } => smallvec![Effect::None],
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Boxed future that may feed an action back into the reducer
    pub type ActionFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Identifier for a cancellable effect
    ///
    /// Two cancellable effects with the same id never run at once: starting
    /// the second aborts the first.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(String);

    impl EffectId {
        /// Create an effect id
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(id.into())
        }

        /// The id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(ActionFuture<Action>),

        /// Async computation that replaces any running computation with the same id
        Cancellable {
            /// Cancellation key
            id: EffectId,
            /// The computation
            future: ActionFuture<Action>,
        },

        /// Abort the running cancellable effect with this id, if any
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, .. } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .finish_non_exhaustive(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Transform the actions this effect produces
        ///
        /// Used to embed a child reducer's effects in a parent reducer.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Clone + Send + Sync + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
                Effect::Cancellable { id, future } => Effect::Cancellable {
                    id,
                    future: Box::pin(async move { future.await.map(f) }),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
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

    pub use crate::generation::TextGenerator;
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};

    #[derive(Clone, Debug, PartialEq)]
    enum Inner {
        Done(u32),
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Outer {
        Child(Inner),
    }

    #[test]
    fn test_effect_id_display() {
        let id = EffectId::new("content-title");
        assert_eq!(id.to_string(), "content-title");
        assert_eq!(id.as_str(), "content-title");
    }

    #[test]
    fn test_map_preserves_cancel_id() {
        let effect: Effect<Inner> = Effect::Cancel(EffectId::new("x"));
        let mapped = effect.map(Outer::Child);
        assert!(matches!(mapped, Effect::Cancel(id) if id.as_str() == "x"));
    }

    #[test]
    #[allow(clippy::panic)] // Test code
    fn test_map_future_output() {
        let effect: Effect<Inner> = Effect::Future(Box::pin(async { Some(Inner::Done(7)) }));
        let mapped = effect.map(Outer::Child);
        let Effect::Future(fut) = mapped else {
            panic!("expected a future effect");
        };
        let action = tokio_test::block_on(fut);
        assert_eq!(action, Some(Outer::Child(Inner::Done(7))));
    }

    #[test]
    fn test_debug_hides_future() {
        let effect: Effect<Inner> = Effect::Cancellable {
            id: EffectId::new("content-title"),
            future: Box::pin(async { None }),
        };
        let rendered = format!("{effect:?}");
        assert!(rendered.contains("content-title"));
        assert!(Effect::<Inner>::None.is_none());
    }
}
