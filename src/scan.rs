//! Ticket validation workflow for the admin QR scanner.
//!
//! The scanner widget hands over a decoded string (or an empty string when
//! the read fails); each non-empty code is checked against the backend and
//! the outcome is appended to an in-session history, newest first.

use crate::environment::Clock;
use crate::gateway::PaymentGateway;
use crate::reducer::{Effect, Effects, Reducer};
use chrono::{DateTime, Utc};
use smallvec::smallvec;
use std::sync::Arc;

/// One checked code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// The decoded ticket code.
    pub code: String,
    /// Whether the backend accepted it.
    pub valid: bool,
    /// When the check finished.
    pub checked_at: DateTime<Utc>,
}

/// Scanner screen state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    /// Checked codes, newest first.
    pub history: Vec<ScanEntry>,
    /// Scanner or transport failure, if any.
    pub error: Option<String>,
}

/// Scanner actions.
#[derive(Debug, Clone)]
pub enum ScanAction {
    /// The scanner decoded a string. Empty means the read failed.
    CodeScanned(String),
    /// The scanner itself reported a failure.
    ScannerFailed(String),
    /// The backend answered for a code.
    Checked {
        /// The code that was checked.
        code: String,
        /// Whether the ticket is valid.
        valid: bool,
    },
}

/// Collaborators of the scanner screen.
#[derive(Clone)]
pub struct ScanEnvironment {
    /// Ticket validation endpoint.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Session token sent with every check.
    pub token: String,
    /// Source of timestamps for history entries.
    pub clock: Arc<dyn Clock>,
}

/// Reducer for the scanner screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanReducer;

impl Reducer for ScanReducer {
    type State = ScanState;
    type Action = ScanAction;
    type Environment = ScanEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            ScanAction::CodeScanned(code) => {
                if code.is_empty() {
                    state.error = Some("Falha ao ler o código".to_owned());
                    return smallvec![];
                }
                state.error = None;
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.token.clone();
                smallvec![Effect::future(async move {
                    // Rejected and unreachable both read as an invalid
                    // ticket; only the widget itself reports scanner errors.
                    Some(match gateway.validate_ticket(&code, &token).await {
                        Ok(()) => ScanAction::Checked { code, valid: true },
                        Err(err) => {
                            tracing::warn!(error = %err, "ticket check failed");
                            ScanAction::Checked { code, valid: false }
                        }
                    })
                })]
            }
            ScanAction::ScannerFailed(message) => {
                state.error = Some(message);
                smallvec![]
            }
            ScanAction::Checked { code, valid } => {
                state.history.insert(
                    0,
                    ScanEntry {
                        code,
                        valid,
                        checked_at: environment.clock.now(),
                    },
                );
                smallvec![]
            }
        }
    }
}
