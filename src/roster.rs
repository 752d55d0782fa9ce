//! Admin roster: a generic paginated CRUD workflow over one remote resource.
//!
//! The same reducer drives the user and ticket administration screens; the
//! resource type, gateway and failure wording are all injected through the
//! environment. Remote failures never touch the collection, they only set
//! the screen error.

use crate::gateway::{CrudGateway, Entity, GatewayError, SERVICE_UNAVAILABLE};
use crate::paging::Paged;
use crate::reducer::{Effect, Effects, Reducer};
use smallvec::smallvec;
use std::marker::PhantomData;
use std::sync::Arc;

/// Per-resource failure wording.
#[derive(Debug, Clone)]
pub struct RosterMessages {
    /// Shown when a create call is rejected.
    pub create_failed: &'static str,
    /// Shown when an update call is rejected.
    pub update_failed: &'static str,
    /// Shown when a delete call is rejected.
    pub delete_failed: &'static str,
}

impl RosterMessages {
    /// Wording for the ticket administration screen.
    #[must_use]
    pub const fn tickets() -> Self {
        Self {
            create_failed:
                "Ocorreu um problema ao tentar criar um ingresso para este cpf, tente novamente",
            update_failed: "Ocorreu um problema ao tentar alterar o ingresso, tente novamente",
            delete_failed: "Erro ao deletar ingresso",
        }
    }

    /// Wording for the user administration screen.
    #[must_use]
    pub const fn users() -> Self {
        Self {
            create_failed: "Ocorreu um problema ao tentar criar um usuário, tente novamente",
            update_failed: "Ocorreu um problema ao tentar alterar o usuário, tente novamente",
            delete_failed: "Erro ao deletar usuário",
        }
    }
}

/// Roster screen state.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterState<T> {
    /// The collection with its page window.
    pub paged: Paged<T>,
    /// Last remote failure, if any.
    pub error: Option<String>,
}

impl<T> Default for RosterState<T> {
    fn default() -> Self {
        Self {
            paged: Paged::default(),
            error: None,
        }
    }
}

/// Roster actions.
#[derive(Debug, Clone)]
pub enum RosterAction<T: Entity> {
    /// Fetches the whole collection.
    Load,
    /// The collection arrived.
    Loaded(Vec<T>),
    /// Creates a record from a draft.
    Create(T::Draft),
    /// The backend stored a new record.
    Created(T),
    /// Replaces the record with the given id.
    Update {
        /// Id of the record being replaced.
        id: T::Id,
        /// New contents.
        draft: T::Draft,
    },
    /// The backend stored the replacement.
    Updated(T),
    /// Deletes the record with the given id.
    Delete(T::Id),
    /// The backend confirmed the deletion.
    Deleted(T::Id),
    /// A remote call was rejected or unreachable.
    Failed(String),
    /// Shows the next page.
    NextPage,
    /// Shows the previous page.
    PrevPage,
}

/// Collaborators of a roster screen.
#[derive(Clone)]
pub struct RosterEnvironment<T: Entity> {
    /// CRUD endpoints for the resource.
    pub gateway: Arc<dyn CrudGateway<T>>,
    /// Session token sent with every call.
    pub token: String,
    /// Failure wording for this resource.
    pub messages: RosterMessages,
}

/// Reducer for a roster screen over resource `T`.
#[derive(Debug, Clone, Copy)]
pub struct RosterReducer<T>(PhantomData<fn() -> T>);

impl<T> Default for RosterReducer<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

fn failure_message(err: &GatewayError, rejected: &'static str) -> String {
    if err.is_transport() {
        SERVICE_UNAVAILABLE.to_owned()
    } else {
        rejected.to_owned()
    }
}

impl<T: Entity> Reducer for RosterReducer<T> {
    type State = RosterState<T>;
    type Action = RosterAction<T>;
    type Environment = RosterEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            RosterAction::Load => {
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.token.clone();
                smallvec![Effect::future(async move {
                    Some(match gateway.list(&token).await {
                        Ok(items) => RosterAction::Loaded(items),
                        Err(err) => {
                            tracing::warn!(error = %err, "roster load failed");
                            RosterAction::Failed(SERVICE_UNAVAILABLE.to_owned())
                        }
                    })
                })]
            }
            RosterAction::Loaded(items) => {
                state.paged.replace(items);
                state.error = None;
                smallvec![]
            }
            RosterAction::Create(draft) => {
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.token.clone();
                let rejected = environment.messages.create_failed;
                smallvec![Effect::future(async move {
                    Some(match gateway.create(&draft, &token).await {
                        Ok(record) => RosterAction::Created(record),
                        Err(err) => {
                            tracing::warn!(error = %err, "roster create failed");
                            RosterAction::Failed(failure_message(&err, rejected))
                        }
                    })
                })]
            }
            RosterAction::Created(record) => {
                state.paged.items.push(record);
                state.paged.reclamp();
                state.error = None;
                smallvec![]
            }
            RosterAction::Update { id, draft } => {
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.token.clone();
                let rejected = environment.messages.update_failed;
                smallvec![Effect::future(async move {
                    Some(match gateway.update(&id, &draft, &token).await {
                        Ok(record) => RosterAction::Updated(record),
                        Err(err) => {
                            tracing::warn!(error = %err, "roster update failed");
                            RosterAction::Failed(failure_message(&err, rejected))
                        }
                    })
                })]
            }
            RosterAction::Updated(record) => {
                // Matched by id so the row keeps its position regardless of
                // what page it is on.
                if let Some(existing) = state
                    .paged
                    .items
                    .iter_mut()
                    .find(|item| item.id() == record.id())
                {
                    *existing = record;
                }
                state.error = None;
                smallvec![]
            }
            RosterAction::Delete(id) => {
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.token.clone();
                let rejected = environment.messages.delete_failed;
                smallvec![Effect::future(async move {
                    Some(match gateway.delete(&id, &token).await {
                        Ok(()) => RosterAction::Deleted(id),
                        Err(err) => {
                            tracing::warn!(error = %err, "roster delete failed");
                            RosterAction::Failed(failure_message(&err, rejected))
                        }
                    })
                })]
            }
            RosterAction::Deleted(id) => {
                state.paged.items.retain(|item| *item.id() != id);
                state.paged.reclamp();
                state.error = None;
                smallvec![]
            }
            RosterAction::Failed(message) => {
                state.error = Some(message);
                smallvec![]
            }
            RosterAction::NextPage => {
                state.paged.next_page();
                smallvec![]
            }
            RosterAction::PrevPage => {
                state.paged.prev_page();
                smallvec![]
            }
        }
    }
}
