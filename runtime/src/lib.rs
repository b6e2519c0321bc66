//! # Feastflow Runtime
//!
//! Runtime implementation for Feastflow wizards.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation Registry**: Tracks running cancellable effects by [`EffectId`]
//!
//! ## Example
//!
//! ```ignore
//! use feastflow_runtime::Store;
//!
//! let store = Store::new(
//!     initial_state,
//!     my_reducer,
//!     environment,
//! );
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use feastflow_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned by
/// one action. Actions fed back by those effects are reduced before the
/// effect that produced them counts as complete.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(ContentAction::Generate { .. }).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The generated content has been reduced into state
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs when the effect finishes, panics, or is aborted by cancellation.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Internal: running cancellable effects keyed by id
///
/// Each entry carries a generation so a finishing task only removes its own
/// registration, never that of a newer task with the same id.
#[derive(Default)]
struct CancellationRegistry {
    next_generation: AtomicU64,
    running: Mutex<HashMap<EffectId, (u64, tokio::task::AbortHandle)>>,
}

impl CancellationRegistry {
    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Abort the task registered under `id`, returning whether one was running
    fn cancel(&self, id: &EffectId) -> bool {
        let previous = match self.running.lock() {
            Ok(mut running) => running.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
        previous.is_some_and(|(_, handle)| {
            handle.abort();
            true
        })
    }

    fn register(&self, id: EffectId, generation: u64, handle: tokio::task::AbortHandle) {
        let previous = match self.running.lock() {
            Ok(mut running) => running.insert(id, (generation, handle)),
            Err(poisoned) => poisoned.into_inner().insert(id, (generation, handle)),
        };
        if let Some((_, stale)) = previous {
            stale.abort();
        }
    }

    fn finish(&self, id: &EffectId, generation: u64) {
        let mut running = match self.running.lock() {
            Ok(running) => running,
            Err(poisoned) => poisoned.into_inner(),
        };
        if running.get(id).is_some_and(|(current, _)| *current == generation) {
            running.remove(id);
        }
    }

    fn is_running(&self, id: &EffectId) -> bool {
        match self.running.lock() {
            Ok(running) => running.contains_key(id),
            Err(poisoned) => poisoned.into_inner().contains_key(id),
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, CancellationRegistry, DecrementGuard, Duration, Effect, EffectHandle, EffectId,
        EffectTracking, Reducer, RwLock, StoreError,
    };
    use feastflow_core::effect::ActionFuture;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (wizard logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        cancellations: Arc<CancellationRegistry>,
        /// Action broadcast channel for observing actions produced by effects.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast holds 16 actions; use
        /// [`Store::with_broadcast_capacity`] for chattier reducers.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a new store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                cancellations: Arc::new(CancellationRegistry::default()),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects asynchronously
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Use the returned [`EffectHandle`] to wait.
        ///
        /// # Errors
        ///
        /// Currently infallible; the `Result` leaves room for admission
        /// control without breaking callers.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, so a result
        /// produced immediately by an effect is not missed. The matching
        /// action has already been reduced when this returns.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Actions sent directly through [`Store::send`] are not broadcast.
        /// Each action is broadcast after the reducer has applied it.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let step = store.state(|s| s.session.current_step()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Whether a cancellable effect with this id is still running
        #[must_use]
        pub fn is_running(&self, id: &EffectId) -> bool {
            self.cancellations.is_running(id)
        }

        fn spawn_feedback(
            &self,
            fut: ActionFuture<A>,
            tracking: &EffectTracking,
        ) -> tokio::task::JoinHandle<Option<()>>
        where
            R: Clone,
            E: Clone,
        {
            tracking.increment();
            let guard = DecrementGuard(tracking.clone());
            let store = self.clone();

            tokio::spawn(async move {
                let _guard = guard;
                let action = fut.await?;
                tracing::trace!("Effect produced an action, sending to store");

                // Reduce before broadcasting so observers see the updated state
                let _ = store.send(action.clone()).await;
                let _ = store.action_broadcast.send(action);
                Some(())
            })
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Cancellable`: Like `Future`, aborting any running effect with the same id
        /// - `Cancel`: Aborts the running effect with the given id
        /// - `Delay`: Waits for duration, then sends action
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    drop(self.spawn_feedback(fut, tracking));
                },
                Effect::Cancellable { id, future } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable")
                        .increment(1);
                    if self.cancellations.cancel(&id) {
                        tracing::debug!(effect_id = %id, "Replaced running effect");
                        metrics::counter!("store.effects.cancelled").increment(1);
                    }

                    let generation = self.cancellations.next_generation();
                    let registry = Arc::clone(&self.cancellations);
                    let finished_id = id.clone();
                    // The task may only finish once it is registered
                    let (registered, wait_registered) = tokio::sync::oneshot::channel::<()>();
                    let future: ActionFuture<A> = Box::pin(async move {
                        let _ = wait_registered.await;
                        let action = future.await;
                        registry.finish(&finished_id, generation);
                        action
                    });

                    let handle = self.spawn_feedback(future, tracking);
                    self.cancellations.register(id, generation, handle.abort_handle());
                    let _ = registered.send(());
                },
                Effect::Cancel(id) => {
                    if self.cancellations.cancel(&id) {
                        tracing::debug!(effect_id = %id, "Cancelled running effect");
                        metrics::counter!("store.effects.cancelled").increment(1);
                    }
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    let fut: ActionFuture<A> = Box::pin(async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    });
                    drop(self.spawn_feedback(fut, tracking));
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    tracking.increment();
                    let guard = DecrementGuard(tracking.clone());
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        for effect in effects {
                            let (mut sub_handle, sub_tracking) = EffectHandle::new();
                            store.execute_effect(effect, &sub_tracking);
                            drop(sub_tracking);
                            sub_handle.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
            }
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
                cancellations: Arc::clone(&self.cancellations),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
