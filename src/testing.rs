//! Test support: a fluent reducer harness, effect assertions, a fixed
//! clock, and in-memory gateway mocks.
//!
//! Lives in the crate proper (not behind `cfg(test)`) so integration tests
//! can drive stores with the same mocks the unit tests use.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use crate::environment::Clock;
use crate::gateway::{
    AccountGateway, CrudGateway, Entity, GatewayError, GatewayFuture, PaymentGateway,
};
use crate::reducer::{Effects, Reducer};
use crate::types::{
    CpfValidation, LoginRequest, LoginResponse, PaymentRequest, RegisterRequest, Role,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fluent given/when/then harness for a single reduce call.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(PurchaseReducer, env())
///     .given_state(PurchaseState::default())
///     .when_action(PurchaseAction::Advance)
///     .then_state(|state| assert!(state.form_error.is_some()));
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    environment: R::Environment,
    state: Option<R::State>,
    effects: Option<Effects<R::Action>>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Creates a harness around a reducer and its environment.
    pub fn new(reducer: R, environment: R::Environment) -> Self {
        Self {
            reducer,
            environment,
            state: None,
            effects: None,
        }
    }

    /// Sets the state the action will run against.
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Runs the reducer once, capturing the new state and effects.
    ///
    /// # Panics
    ///
    /// Panics when called before [`ReducerTest::given_state`].
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        let mut state = self
            .state
            .take()
            .expect("given_state must be called before when_action");
        let effects = self.reducer.reduce(&mut state, action, &self.environment);
        self.state = Some(state);
        self.effects = Some(effects);
        self
    }

    /// Asserts over the state after the action.
    ///
    /// # Panics
    ///
    /// Panics when called before [`ReducerTest::when_action`].
    #[must_use]
    pub fn then_state(self, f: impl FnOnce(&R::State)) -> Self {
        f(self
            .state
            .as_ref()
            .expect("when_action must run before then_state"));
        self
    }

    /// Asserts over the effects returned by the action.
    ///
    /// # Panics
    ///
    /// Panics when called before [`ReducerTest::when_action`].
    #[must_use]
    pub fn then_effects(self, f: impl FnOnce(&Effects<R::Action>)) -> Self {
        f(self
            .effects
            .as_ref()
            .expect("when_action must run before then_effects"));
        self
    }
}

/// Assertions over reducer effect lists.
pub mod assertions {
    use crate::reducer::{Effect, Effects};
    use std::time::Duration;

    /// Asserts the reducer returned no effects at all.
    pub fn assert_no_effects<A>(effects: &Effects<A>) {
        assert!(
            effects.is_empty(),
            "expected no effects, got {}",
            effects.len()
        );
    }

    /// Asserts the exact number of effects.
    pub fn assert_effects_count<A>(effects: &Effects<A>, expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "expected {expected} effects, got {}",
            effects.len()
        );
    }

    /// Asserts at least one future effect is present.
    pub fn assert_has_future_effect<A>(effects: &Effects<A>) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "expected a future effect"
        );
    }

    /// Asserts a delay effect with the given duration is present.
    pub fn assert_has_delay_effect<A>(effects: &Effects<A>, expected: Duration) {
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::Delay { duration, .. } if *duration == expected)),
            "expected a delay effect of {expected:?}"
        );
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// A fixed clock at a stable, arbitrary instant.
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default())
}

/// Payment gateway mock. Records every call and answers with a canned
/// outcome.
pub struct MockPaymentGateway {
    succeed: AtomicBool,
    /// Payment requests received, in call order.
    pub submitted: Mutex<Vec<PaymentRequest>>,
    /// Ticket codes checked, in call order.
    pub checked: Mutex<Vec<String>>,
}

impl MockPaymentGateway {
    /// Every call succeeds.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_outcome(true)
    }

    /// Every call is rejected with a status error.
    #[must_use]
    pub fn failing() -> Self {
        Self::with_outcome(false)
    }

    fn with_outcome(succeed: bool) -> Self {
        Self {
            succeed: AtomicBool::new(succeed),
            submitted: Mutex::new(Vec::new()),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Flips the canned outcome for subsequent calls.
    pub fn set_succeeding(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::SeqCst);
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn submit_payment(&self, request: &PaymentRequest, _token: &str) -> GatewayFuture<()> {
        self.submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let result = if self.succeed.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Status(402))
        };
        Box::pin(async move { result })
    }

    fn validate_ticket(&self, ticket_id: &str, _token: &str) -> GatewayFuture<()> {
        self.checked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ticket_id.to_owned());
        let result = if self.succeed.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Status(404))
        };
        Box::pin(async move { result })
    }
}

/// Account gateway mock backed by in-memory account records.
#[derive(Default)]
pub struct MockAccountGateway {
    /// Known CPFs and whether they are still on first access.
    accounts: Mutex<HashMap<String, MockAccount>>,
}

#[derive(Clone)]
struct MockAccount {
    first_access: bool,
    password: Option<String>,
    role: Role,
}

impl MockAccountGateway {
    /// Registers a CPF that has already completed first access.
    #[must_use]
    pub fn with_account(self, cpf: &str, password: &str, role: Role) -> Self {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner()).insert(
            cpf.to_owned(),
            MockAccount {
                first_access: false,
                password: Some(password.to_owned()),
                role,
            },
        );
        self
    }

    /// Registers a CPF that has never set a password.
    #[must_use]
    pub fn with_first_access_cpf(self, cpf: &str) -> Self {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner()).insert(
            cpf.to_owned(),
            MockAccount {
                first_access: true,
                password: None,
                role: Role::Comum,
            },
        );
        self
    }
}

impl AccountGateway for MockAccountGateway {
    fn validate_cpf(&self, cpf: &str) -> GatewayFuture<CpfValidation> {
        let result = self
            .accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(cpf)
            .map(|account| CpfValidation {
                first_access: account.first_access,
            })
            .ok_or(GatewayError::Status(404));
        Box::pin(async move { result })
    }

    fn register_first_access(&self, request: &RegisterRequest) -> GatewayFuture<()> {
        let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        let result = match accounts.get_mut(&request.cpf) {
            Some(account) if account.first_access => {
                account.first_access = false;
                account.password = Some(request.password.clone());
                Ok(())
            }
            _ => Err(GatewayError::Status(400)),
        };
        Box::pin(async move { result })
    }

    fn login(&self, request: &LoginRequest) -> GatewayFuture<LoginResponse> {
        let result = self
            .accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&request.cpf)
            .filter(|account| account.password.as_deref() == Some(request.password.as_str()))
            .map(|account| LoginResponse {
                token: format!("token-{}", request.cpf),
                tipo: account.role,
            })
            .ok_or(GatewayError::Status(401));
        Box::pin(async move { result })
    }
}

/// CRUD gateway mock with a canned collection and per-call result queues.
///
/// `list` clones the collection. `create` and `update` pop their queues and
/// reject with a 500 when empty. `delete` pops its queue and succeeds when
/// empty, which is the common case.
pub struct MockCrudGateway<T: Entity> {
    /// What `list` returns.
    pub collection: Mutex<Vec<T>>,
    /// Queued `create` outcomes; `Err` holds the status code.
    pub create_results: Mutex<VecDeque<Result<T, u16>>>,
    /// Queued `update` outcomes; `Err` holds the status code.
    pub update_results: Mutex<VecDeque<Result<T, u16>>>,
    /// Queued `delete` outcomes; `Err` holds the status code.
    pub delete_results: Mutex<VecDeque<Result<(), u16>>>,
}

impl<T: Entity> Default for MockCrudGateway<T> {
    fn default() -> Self {
        Self {
            collection: Mutex::new(Vec::new()),
            create_results: Mutex::new(VecDeque::new()),
            update_results: Mutex::new(VecDeque::new()),
            delete_results: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T: Entity> MockCrudGateway<T> {
    /// Seeds the collection `list` will return.
    #[must_use]
    pub fn with_collection(self, items: Vec<T>) -> Self {
        *self.collection.lock().unwrap_or_else(|e| e.into_inner()) = items;
        self
    }

    /// Queues a successful `create` returning `record`.
    #[must_use]
    pub fn with_create_ok(self, record: T) -> Self {
        self.create_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(record));
        self
    }

    /// Queues a successful `update` returning `record`.
    #[must_use]
    pub fn with_update_ok(self, record: T) -> Self {
        self.update_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(record));
        self
    }

    /// Queues a rejected `delete` with the given status.
    #[must_use]
    pub fn with_delete_status(self, status: u16) -> Self {
        self.delete_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(status));
        self
    }
}

impl<T: Entity> CrudGateway<T> for MockCrudGateway<T> {
    fn list(&self, _token: &str) -> GatewayFuture<Vec<T>> {
        let items = self
            .collection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        Box::pin(async move { Ok(items) })
    }

    fn create(&self, _draft: &T::Draft, _token: &str) -> GatewayFuture<T> {
        let result = self
            .create_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(500))
            .map_err(GatewayError::Status);
        Box::pin(async move { result })
    }

    fn update(&self, _id: &T::Id, _draft: &T::Draft, _token: &str) -> GatewayFuture<T> {
        let result = self
            .update_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(500))
            .map_err(GatewayError::Status);
        Box::pin(async move { result })
    }

    fn delete(&self, _id: &T::Id, _token: &str) -> GatewayFuture<()> {
        let result = self
            .delete_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(()))
            .map_err(GatewayError::Status);
        Box::pin(async move { result })
    }
}
