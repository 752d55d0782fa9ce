//! Purchase workflow: a three-step state machine from attendee entry to
//! payment.
//!
//! Steps advance `CollectingAttendees -> Confirming -> Paying` and may move
//! back one at a time. The order survives a completed payment so the receipt
//! stays on screen; starting over is an explicit reset by the caller.

use crate::gateway::PaymentGateway;
use crate::reducer::{Effect, Effects, Reducer};
use crate::types::{Attendee, AttendeeDraft, PaymentItem, PaymentRequest, Session};
use crate::validation::{check_order_not_empty, validate_attendee};
use smallvec::smallvec;
use std::sync::Arc;
use std::time::Duration;

/// How long the payment result dialog stays up before auto-dismissing.
pub const DIALOG_DISPLAY: Duration = Duration::from_secs(2);

/// Dialog message after a confirmed payment.
pub const PAYMENT_SUCCESS_MESSAGE: &str = "Ingresso pago e criado com sucesso!";
/// Dialog message after a failed payment.
pub const PAYMENT_FAILURE_MESSAGE: &str = "Ocorreu algum problema no pagamento!";

/// Where the purchase currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurchaseStep {
    /// Building the attendee list.
    #[default]
    CollectingAttendees,
    /// Reviewing the order and total.
    Confirming,
    /// Payment screen.
    Paying,
}

/// Result dialog shown after a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDialog {
    /// Whether the payment went through.
    pub success: bool,
    /// User-facing message.
    pub message: String,
}

/// Purchase workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PurchaseState {
    /// Current step.
    pub step: PurchaseStep,
    /// Attendees added so far.
    pub order: Vec<Attendee>,
    /// The form being edited.
    pub draft: AttendeeDraft,
    /// Last validation or advancement error, if any.
    pub form_error: Option<String>,
    /// Payment result dialog, when showing.
    pub dialog: Option<PaymentDialog>,
}

/// Purchase workflow actions.
#[derive(Debug, Clone)]
pub enum PurchaseAction {
    /// Edits the draft name field.
    SetName(String),
    /// Edits the draft birth date field.
    SetBirthDate(String),
    /// Selects the draft marital status.
    SetMaritalStatus(String),
    /// Validates the draft and adds it to the order.
    AddAttendee,
    /// Removes the attendee with the given id.
    RemoveAttendee {
        /// Id assigned when the attendee was added.
        id: u32,
    },
    /// Moves to the next step.
    Advance,
    /// Moves back one step.
    Back,
    /// Submits the order for payment.
    Pay,
    /// Payment attempt finished.
    PaymentSettled {
        /// Whether the backend confirmed the charge.
        success: bool,
    },
    /// Closes the payment result dialog.
    DismissDialog,
}

/// Collaborators of the purchase workflow.
#[derive(Clone)]
pub struct PurchaseEnvironment {
    /// Payment endpoint.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Active session; its token authorizes the payment call.
    pub session: Session,
}

/// Reducer for the purchase workflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurchaseReducer;

impl Reducer for PurchaseReducer {
    type State = PurchaseState;
    type Action = PurchaseAction;
    type Environment = PurchaseEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            PurchaseAction::SetName(value) => {
                state.draft.name = value;
                smallvec![]
            }
            PurchaseAction::SetBirthDate(value) => {
                state.draft.birth_date = value;
                smallvec![]
            }
            PurchaseAction::SetMaritalStatus(value) => {
                state.draft.marital_status = value;
                smallvec![]
            }
            PurchaseAction::AddAttendee => {
                match validate_attendee(&state.draft) {
                    Ok(()) => {
                        // Ids count up from one and stay unique across
                        // removals, so RemoveAttendee hits a single row.
                        let id = state.order.iter().map(|a| a.id).max().unwrap_or(0) + 1;
                        state.order.push(Attendee::from_draft(id, &state.draft));
                        state.draft = AttendeeDraft::default();
                        state.form_error = None;
                    }
                    Err(err) => state.form_error = Some(err.message),
                }
                smallvec![]
            }
            PurchaseAction::RemoveAttendee { id } => {
                state.order.retain(|attendee| attendee.id != id);
                smallvec![]
            }
            PurchaseAction::Advance => {
                match state.step {
                    PurchaseStep::CollectingAttendees => match check_order_not_empty(&state.order)
                    {
                        Ok(()) => {
                            state.step = PurchaseStep::Confirming;
                            state.form_error = None;
                        }
                        Err(err) => state.form_error = Some(err.message),
                    },
                    PurchaseStep::Confirming => state.step = PurchaseStep::Paying,
                    PurchaseStep::Paying => {}
                }
                smallvec![]
            }
            PurchaseAction::Back => {
                state.step = match state.step {
                    PurchaseStep::CollectingAttendees => PurchaseStep::CollectingAttendees,
                    PurchaseStep::Confirming => PurchaseStep::CollectingAttendees,
                    PurchaseStep::Paying => PurchaseStep::Confirming,
                };
                smallvec![]
            }
            PurchaseAction::Pay => {
                if state.step != PurchaseStep::Paying {
                    return smallvec![];
                }
                let request = PaymentRequest {
                    ingressos: state.order.iter().map(PaymentItem::from).collect(),
                };
                let gateway = Arc::clone(&environment.gateway);
                let token = environment.session.token.clone();
                smallvec![Effect::future(async move {
                    let result = gateway.submit_payment(&request, &token).await;
                    if let Err(err) = &result {
                        tracing::warn!(error = %err, "payment submission failed");
                    }
                    Some(PurchaseAction::PaymentSettled {
                        success: result.is_ok(),
                    })
                })]
            }
            PurchaseAction::PaymentSettled { success } => {
                let message = if success {
                    PAYMENT_SUCCESS_MESSAGE
                } else {
                    PAYMENT_FAILURE_MESSAGE
                };
                state.dialog = Some(PaymentDialog {
                    success,
                    message: message.to_owned(),
                });
                smallvec![Effect::delay(
                    DIALOG_DISPLAY,
                    PurchaseAction::DismissDialog
                )]
            }
            PurchaseAction::DismissDialog => {
                state.dialog = None;
                smallvec![]
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::assertions::{assert_has_delay_effect, assert_no_effects};
    use crate::testing::{MockPaymentGateway, ReducerTest};

    fn env() -> PurchaseEnvironment {
        PurchaseEnvironment {
            gateway: Arc::new(MockPaymentGateway::succeeding()),
            session: Session::authenticated("tok".to_owned(), false),
        }
    }

    fn filled_draft() -> AttendeeDraft {
        AttendeeDraft {
            name: "Maria Silva".to_owned(),
            birth_date: "01/02/1990".to_owned(),
            marital_status: "Solteiro(a)".to_owned(),
        }
    }

    #[test]
    fn valid_draft_joins_order_and_resets_form() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState {
                draft: filled_draft(),
                ..PurchaseState::default()
            })
            .when_action(PurchaseAction::AddAttendee)
            .then_state(|state| {
                assert_eq!(state.order.len(), 1);
                assert_eq!(state.order[0].id, 1);
                assert_eq!(state.order[0].name, "Maria Silva");
                assert_eq!(state.draft, AttendeeDraft::default());
                assert!(state.form_error.is_none());
            })
            .then_effects(assert_no_effects);
    }

    #[test]
    fn invalid_draft_sets_form_error_and_keeps_order() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState::default())
            .when_action(PurchaseAction::AddAttendee)
            .then_state(|state| {
                assert!(state.order.is_empty());
                assert_eq!(state.form_error.as_deref(), Some("Nome não pode estar vazio"));
            })
            .then_effects(assert_no_effects);
    }

    #[test]
    fn ids_count_up_in_entry_order() {
        let reducer = PurchaseReducer;
        let environment = env();
        let mut state = PurchaseState {
            draft: filled_draft(),
            ..PurchaseState::default()
        };
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        state.draft = filled_draft();
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        assert_eq!(
            state.order.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn ids_stay_unique_after_a_removal() {
        let reducer = PurchaseReducer;
        let environment = env();
        let mut state = PurchaseState {
            draft: filled_draft(),
            ..PurchaseState::default()
        };
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        state.draft = filled_draft();
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        reducer.reduce(
            &mut state,
            PurchaseAction::RemoveAttendee { id: 1 },
            &environment,
        );
        state.draft = filled_draft();
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);

        assert_eq!(
            state.order.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        reducer.reduce(
            &mut state,
            PurchaseAction::RemoveAttendee { id: 2 },
            &environment,
        );
        assert_eq!(state.order.len(), 1);
        assert_eq!(state.order[0].id, 3);
    }

    #[test]
    fn remove_drops_only_the_matching_attendee() {
        let reducer = PurchaseReducer;
        let environment = env();
        let mut state = PurchaseState {
            draft: filled_draft(),
            ..PurchaseState::default()
        };
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        state.draft = filled_draft();
        reducer.reduce(&mut state, PurchaseAction::AddAttendee, &environment);
        reducer.reduce(
            &mut state,
            PurchaseAction::RemoveAttendee { id: 1 },
            &environment,
        );
        assert_eq!(state.order.len(), 1);
        assert_eq!(state.order[0].id, 2);
    }

    #[test]
    fn advance_is_blocked_on_empty_order() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState::default())
            .when_action(PurchaseAction::Advance)
            .then_state(|state| {
                assert_eq!(state.step, PurchaseStep::CollectingAttendees);
                assert_eq!(
                    state.form_error.as_deref(),
                    Some("Adicione ingressos na lista para poder avançar")
                );
            });
    }

    #[test]
    fn advance_walks_forward_through_steps() {
        let reducer = PurchaseReducer;
        let environment = env();
        let mut state = PurchaseState {
            order: vec![Attendee::from_draft(1, &filled_draft())],
            ..PurchaseState::default()
        };
        reducer.reduce(&mut state, PurchaseAction::Advance, &environment);
        assert_eq!(state.step, PurchaseStep::Confirming);
        reducer.reduce(&mut state, PurchaseAction::Advance, &environment);
        assert_eq!(state.step, PurchaseStep::Paying);
        reducer.reduce(&mut state, PurchaseAction::Advance, &environment);
        assert_eq!(state.step, PurchaseStep::Paying);
    }

    #[test]
    fn back_walks_to_the_first_step_and_stops() {
        let reducer = PurchaseReducer;
        let environment = env();
        let mut state = PurchaseState {
            step: PurchaseStep::Paying,
            ..PurchaseState::default()
        };
        reducer.reduce(&mut state, PurchaseAction::Back, &environment);
        assert_eq!(state.step, PurchaseStep::Confirming);
        reducer.reduce(&mut state, PurchaseAction::Back, &environment);
        assert_eq!(state.step, PurchaseStep::CollectingAttendees);
        reducer.reduce(&mut state, PurchaseAction::Back, &environment);
        assert_eq!(state.step, PurchaseStep::CollectingAttendees);
    }

    #[test]
    fn pay_outside_payment_step_does_nothing() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState::default())
            .when_action(PurchaseAction::Pay)
            .then_effects(assert_no_effects);
    }

    #[test]
    fn pay_in_payment_step_starts_one_effect() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState {
                step: PurchaseStep::Paying,
                order: vec![Attendee::from_draft(1, &filled_draft())],
                ..PurchaseState::default()
            })
            .when_action(PurchaseAction::Pay)
            .then_effects(|effects| assert_eq!(effects.len(), 1));
    }

    #[test]
    fn settled_payment_shows_dialog_and_schedules_dismissal() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState {
                step: PurchaseStep::Paying,
                order: vec![Attendee::from_draft(1, &filled_draft())],
                ..PurchaseState::default()
            })
            .when_action(PurchaseAction::PaymentSettled { success: true })
            .then_state(|state| {
                let dialog = state.dialog.as_ref().unwrap();
                assert!(dialog.success);
                assert_eq!(dialog.message, PAYMENT_SUCCESS_MESSAGE);
                // The order stays so the receipt can still show it.
                assert_eq!(state.order.len(), 1);
            })
            .then_effects(|effects| assert_has_delay_effect(effects, DIALOG_DISPLAY));
    }

    #[test]
    fn failed_payment_shows_failure_dialog() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState {
                step: PurchaseStep::Paying,
                ..PurchaseState::default()
            })
            .when_action(PurchaseAction::PaymentSettled { success: false })
            .then_state(|state| {
                let dialog = state.dialog.as_ref().unwrap();
                assert!(!dialog.success);
                assert_eq!(dialog.message, PAYMENT_FAILURE_MESSAGE);
            });
    }

    #[test]
    fn dismiss_clears_dialog() {
        ReducerTest::new(PurchaseReducer, env())
            .given_state(PurchaseState {
                dialog: Some(PaymentDialog {
                    success: true,
                    message: PAYMENT_SUCCESS_MESSAGE.to_owned(),
                }),
                ..PurchaseState::default()
            })
            .when_action(PurchaseAction::DismissDialog)
            .then_state(|state| assert!(state.dialog.is_none()))
            .then_effects(assert_no_effects);
    }
}
