//! Ingressou: client-side workflows for a CPF-based ticketing system.
//!
//! State lives in reducers (pure state machines returning effect
//! descriptions) driven by a [`store::Store`] runtime. The workflows are:
//!
//! - [`auth`]: CPF-first sign-in with first-access registration.
//! - [`purchase`]: three-step ticket purchase for multiple attendees.
//! - [`roster`]: paginated CRUD administration of users and tickets.
//! - [`scan`]: QR ticket validation with an in-session history.
//!
//! Remote calls go through the trait gateways in [`gateway`]; sessions
//! persist through [`session`].

pub mod auth;
pub mod config;
pub mod environment;
pub mod gateway;
pub mod paging;
pub mod purchase;
pub mod reducer;
pub mod roster;
pub mod scan;
pub mod session;
pub mod store;
pub mod testing;
pub mod types;
pub mod validation;

pub use config::Config;
pub use environment::{Clock, SystemClock};
pub use gateway::{
    AccountGateway, CrudGateway, Entity, GatewayError, GatewayFuture, HttpGateway, PaymentGateway,
    SERVICE_UNAVAILABLE,
};
pub use paging::Paged;
pub use reducer::{Effect, Effects, Reducer};
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use store::{EffectHandle, Store, StoreError};
pub use types::Session;
