//! Authentication workflow.
//!
//! Sign-in is CPF-first: the CPF is checked remotely, then the flow forks
//! into first-access registration or a plain password login. A successful
//! login persists the session through the injected store so the next run
//! starts logged in.

use crate::gateway::AccountGateway;
use crate::reducer::{Effect, Effects, Reducer};
use crate::session::SessionStore;
use crate::types::{LoginRequest, RegisterRequest, Role, Session};
use smallvec::smallvec;
use std::sync::Arc;

/// Shown when the CPF is not recognized by the backend.
pub const INVALID_CPF_MESSAGE: &str = "CPF inválido";
/// Shown when the two password fields disagree during first access.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "As senhas não coincidem";
/// Shown when the first-access registration call is rejected.
pub const REGISTER_FAILED_MESSAGE: &str = "Falha no registro";
/// Shown when the login call is rejected.
pub const LOGIN_FAILED_MESSAGE: &str = "Login falhou";

/// Where the sign-in flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// Asking for the CPF.
    #[default]
    EnterCpf,
    /// First access: choosing e-mail and password.
    FirstAccess,
    /// Known account: asking for the password.
    EnterPassword,
}

/// Authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    /// Current phase.
    pub phase: AuthPhase,
    /// CPF being signed in.
    pub cpf: String,
    /// Active session; default means logged out.
    pub session: Session,
    /// Last failure, if any.
    pub error: Option<String>,
}

/// Authentication actions.
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Submits the CPF for a remote check.
    SubmitCpf(String),
    /// The CPF check finished.
    CpfChecked {
        /// Whether the backend recognizes the CPF.
        valid: bool,
        /// Whether the account has never set a password.
        first_access: bool,
    },
    /// Completes first access.
    Register {
        /// Contact e-mail.
        email: String,
        /// Chosen password.
        password: String,
        /// Confirmation field; must match `password`.
        confirm: String,
    },
    /// Logs in a known account.
    Login {
        /// Account password.
        password: String,
    },
    /// The backend issued a session token.
    LoggedIn {
        /// Session token.
        token: String,
        /// Whether the account is an administrator.
        is_admin: bool,
    },
    /// A remote call was rejected or unreachable.
    Failed(String),
    /// Clears the session.
    Logout,
}

/// Collaborators of the authentication workflow.
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Account endpoints.
    pub gateway: Arc<dyn AccountGateway>,
    /// Where the session is persisted.
    pub sessions: Arc<dyn SessionStore>,
}

/// Reducer for the authentication workflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

fn persist_session(sessions: &Arc<dyn SessionStore>, session: Session) -> Effect<AuthAction> {
    let sessions = Arc::clone(sessions);
    Effect::future(async move {
        if let Err(err) = sessions.save(&session) {
            tracing::warn!(error = %err, "failed to persist session");
        }
        None
    })
}

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            AuthAction::SubmitCpf(cpf) => {
                state.cpf = cpf.clone();
                state.error = None;
                let gateway = Arc::clone(&environment.gateway);
                smallvec![Effect::future(async move {
                    // Any failure, rejected or unreachable, reads as an
                    // unrecognized CPF.
                    Some(match gateway.validate_cpf(&cpf).await {
                        Ok(validation) => AuthAction::CpfChecked {
                            valid: true,
                            first_access: validation.first_access,
                        },
                        Err(err) => {
                            tracing::warn!(error = %err, "cpf check failed");
                            AuthAction::CpfChecked {
                                valid: false,
                                first_access: false,
                            }
                        }
                    })
                })]
            }
            AuthAction::CpfChecked {
                valid,
                first_access,
            } => {
                if !valid {
                    state.error = Some(INVALID_CPF_MESSAGE.to_owned());
                } else if first_access {
                    state.phase = AuthPhase::FirstAccess;
                } else {
                    state.phase = AuthPhase::EnterPassword;
                }
                smallvec![]
            }
            AuthAction::Register {
                email,
                password,
                confirm,
            } => {
                // The mismatch check is local; no call leaves the client.
                if password != confirm {
                    state.error = Some(PASSWORD_MISMATCH_MESSAGE.to_owned());
                    return smallvec![];
                }
                state.error = None;
                let gateway = Arc::clone(&environment.gateway);
                let cpf = state.cpf.clone();
                smallvec![Effect::future(async move {
                    let request = RegisterRequest {
                        cpf: cpf.clone(),
                        password: password.clone(),
                        email,
                    };
                    if let Err(err) = gateway.register_first_access(&request).await {
                        tracing::warn!(error = %err, "first access registration failed");
                        return Some(AuthAction::Failed(REGISTER_FAILED_MESSAGE.to_owned()));
                    }
                    // Registration went through; log straight in.
                    Some(match gateway.login(&LoginRequest { cpf, password }).await {
                        Ok(response) => AuthAction::LoggedIn {
                            token: response.token,
                            is_admin: response.tipo == Role::Admin,
                        },
                        Err(err) => {
                            tracing::warn!(error = %err, "login after registration failed");
                            AuthAction::Failed(LOGIN_FAILED_MESSAGE.to_owned())
                        }
                    })
                })]
            }
            AuthAction::Login { password } => {
                state.error = None;
                let gateway = Arc::clone(&environment.gateway);
                let request = LoginRequest {
                    cpf: state.cpf.clone(),
                    password,
                };
                smallvec![Effect::future(async move {
                    Some(match gateway.login(&request).await {
                        Ok(response) => AuthAction::LoggedIn {
                            token: response.token,
                            is_admin: response.tipo == Role::Admin,
                        },
                        Err(err) => {
                            tracing::warn!(error = %err, "login failed");
                            AuthAction::Failed(LOGIN_FAILED_MESSAGE.to_owned())
                        }
                    })
                })]
            }
            AuthAction::LoggedIn { token, is_admin } => {
                state.session = Session::authenticated(token, is_admin);
                state.error = None;
                smallvec![persist_session(
                    &environment.sessions,
                    state.session.clone()
                )]
            }
            AuthAction::Failed(message) => {
                state.error = Some(message);
                smallvec![]
            }
            AuthAction::Logout => {
                state.session = Session::default();
                state.phase = AuthPhase::EnterCpf;
                state.cpf.clear();
                state.error = None;
                smallvec![persist_session(&environment.sessions, Session::default())]
            }
        }
    }
}
