//! Core reducer abstractions.
//!
//! Every workflow in this crate is a [`Reducer`]: a pure function
//! `(State, Action, Environment) -> Effects`. Reducers validate actions,
//! update state in place, and return [`Effect`] descriptions; the store
//! runtime executes those descriptions and feeds resulting actions back in.

use smallvec::SmallVec;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Effects returned from a single `reduce` call, inlined for the common case.
pub type Effects<A> = SmallVec<[Effect<A>; 4]>;

/// Describes a side effect to be executed by the store runtime.
///
/// Effects are values, not execution: a reducer returning
/// `Effect::Future(..)` has performed no I/O yet.
#[allow(missing_docs)]
pub enum Effect<Action> {
    /// No-op effect.
    None,

    /// Arbitrary async computation; if it resolves to `Some`, the action is
    /// fed back into the reducer.
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// Dispatch an action after a fixed delay (timed dialogs, timeouts).
    Delay {
        /// How long to wait.
        duration: Duration,
        /// Action to dispatch after the delay.
        action: Box<Action>,
    },
}

impl<Action> Effect<Action> {
    /// Wraps an async computation into an effect.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(fut))
    }

    /// Dispatches `action` after `duration` has elapsed.
    #[must_use]
    pub fn delay(duration: Duration, action: Action) -> Self {
        Effect::Delay {
            duration,
            action: Box::new(action),
        }
    }
}

// Manual Debug implementation since Future doesn't implement Debug
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
        }
    }
}

/// The core trait for workflow business logic.
///
/// # Example
///
/// ```ignore
/// impl Reducer for PurchaseReducer {
///     type State = PurchaseState;
///     type Action = PurchaseAction;
///     type Environment = PurchaseEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut PurchaseState,
///         action: PurchaseAction,
///         env: &PurchaseEnvironment,
///     ) -> Effects<PurchaseAction> {
///         // Business logic here
///         SmallVec::new()
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// The action type this reducer processes.
    type Action;

    /// The environment type with injected dependencies.
    type Environment;

    /// Reduce an action into state changes and effect descriptions.
    ///
    /// This must be a pure function apart from the in-place state update:
    /// all I/O goes through the returned effects.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action>;
}
