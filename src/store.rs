//! Store runtime: coordinates reducer execution and effect handling.
//!
//! The store owns state behind an async `RwLock`, runs the reducer under the
//! write lock, then executes the returned effect descriptions in spawned
//! tasks. Actions produced by effects are fed back into the reducer and
//! broadcast to observers, which is what request/response helpers like
//! [`Store::send_and_wait_for`] build on.

use crate::reducer::{Effect, Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Timeout waiting for a terminal action in
    /// [`Store::send_and_wait_for`].
    #[error("Timeout waiting for action")]
    Timeout,

    /// The action broadcast channel closed while waiting.
    #[error("Action broadcast channel closed")]
    ChannelClosed,
}

/// Handle for waiting on the effects spawned by a single `send`.
///
/// Tracks only the effects returned directly by that reduce call; feedback
/// actions spawn their own untracked effects.
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (notifier, completion) = watch::channel(());
        let handle = Self {
            pending: Arc::clone(&pending),
            completion,
        };
        let tracking = EffectTracking { pending, notifier };
        (handle, tracking)
    }

    /// Waits until every tracked effect has finished.
    pub async fn wait(&mut self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Waits for tracked effects with a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] when the deadline expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending.load(Ordering::SeqCst))
            .finish()
    }
}

/// Internal: counter side of an [`EffectHandle`].
struct EffectTracking {
    pending: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

impl Clone for EffectTracking {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
            notifier: self.notifier.clone(),
        }
    }
}

/// RAII guard so the counter is decremented even if an effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// The store: runtime coordinator for one reducer.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(PurchaseState::default(), PurchaseReducer, env);
/// store.send(PurchaseAction::AddAttendee).await;
/// let count = store.state(|s| s.order.len()).await;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    /// All actions produced by effects are broadcast to observers. This is
    /// what enables request/response waits and test synchronization.
    action_broadcast: broadcast::Sender<A>,
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
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates a store with the default action broadcast capacity (16).
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Creates a store with a custom action broadcast capacity, for screens
    /// with many slow observers.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            action_broadcast,
        }
    }

    /// Sends an action through the reducer and starts its effects.
    ///
    /// The reducer runs synchronously under the state write lock; effects are
    /// spawned and may still be running when `send` returns. Use the returned
    /// [`EffectHandle`] to wait for them.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> EffectHandle {
        metrics::counter!("store.actions.total").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            tracing::trace!(count = effects.len(), "reducer returned effects");
            effects
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }

        handle
    }

    /// Sends an action and waits for an effect-produced action matching
    /// `predicate`.
    ///
    /// Designed for request/response flows: subscribe first, send, then wait
    /// for the terminal action.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] when the deadline expires first.
    /// - [`StoreError::ChannelClosed`] when the store drops while waiting.
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe before sending so the terminal action cannot be missed.
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "action observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    }
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Reads state through a closure so the lock is released promptly.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Subscribes to every action produced by effects.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Executes one effect description, feeding any produced action back.
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            }
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                tracking.increment();
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    if let Some(action) = fut.await {
                        store.feed_back(action).await;
                    }
                });
            }
            Effect::Delay { duration, action } => {
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                tracking.increment();
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    tokio::time::sleep(duration).await;
                    store.feed_back(*action).await;
                });
            }
        }
    }

    /// Feeds an effect-produced action back into the reducer, then broadcasts
    /// it. Reducing first means observers that see the action also see its
    /// state change.
    async fn feed_back(&self, action: A) {
        let _ = self.send(action.clone()).await;
        let _ = self.action_broadcast.send(action);
    }
}
