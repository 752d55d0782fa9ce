//! Form validation for attendee drafts.
//!
//! Rules run in declaration order and stop at the first failure, so the
//! error shown to the user is always the first broken field.

use crate::types::{Attendee, AttendeeDraft, MARITAL_STATUSES};
use regex::Regex;
use std::sync::LazyLock;

/// Letters (any script) and spaces only.
#[allow(clippy::unwrap_used)]
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L} ]+$").unwrap());

/// `dd/mm/yyyy` shape. Calendar validity is the server's concern.
#[allow(clippy::unwrap_used)]
static BIRTH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());

/// A failed validation rule, carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// User-facing message, in the application's locale.
    pub message: String,
}

impl ValidationError {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Validates an attendee draft before it joins the order.
///
/// # Errors
///
/// Returns the first failing rule:
/// 1. Name must not be empty.
/// 2. Name must be letters and spaces only.
/// 3. Birth date must not be empty.
/// 4. Birth date must match `dd/mm/yyyy`.
/// 5. Marital status must not be empty.
/// 6. Marital status must be a recognized option.
pub fn validate_attendee(draft: &AttendeeDraft) -> Result<(), ValidationError> {
    if draft.name.is_empty() {
        return Err(ValidationError::new("Nome não pode estar vazio"));
    }
    if !NAME_RE.is_match(&draft.name) {
        return Err(ValidationError::new("Nome inválido"));
    }
    if draft.birth_date.is_empty() {
        return Err(ValidationError::new(
            "Data de nascimento não pode estar vazia",
        ));
    }
    if !BIRTH_DATE_RE.is_match(&draft.birth_date) {
        return Err(ValidationError::new("Data de nascimento inválida"));
    }
    if draft.marital_status.is_empty() {
        return Err(ValidationError::new("Situação não pode estar vazio"));
    }
    if !MARITAL_STATUSES.contains(&draft.marital_status.as_str()) {
        return Err(ValidationError::new("Situação inválido"));
    }
    Ok(())
}

/// The purchase flow cannot advance past an empty order.
///
/// # Errors
///
/// Returns the user-facing prompt when the order has no attendees.
pub fn check_order_not_empty(order: &[Attendee]) -> Result<(), ValidationError> {
    if order.is_empty() {
        return Err(ValidationError::new(
            "Adicione ingressos na lista para poder avançar",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(name: &str, birth_date: &str, marital_status: &str) -> AttendeeDraft {
        AttendeeDraft {
            name: name.to_owned(),
            birth_date: birth_date.to_owned(),
            marital_status: marital_status.to_owned(),
        }
    }

    #[test]
    fn accepts_complete_draft() {
        assert!(validate_attendee(&draft("Maria Silva", "01/02/1990", "Solteiro(a)")).is_ok());
    }

    #[test]
    fn accepts_accented_names() {
        assert!(validate_attendee(&draft("João Conceição", "31/12/2000", "Comprometido(a)")).is_ok());
    }

    #[test]
    fn rejects_empty_name_first() {
        let err = validate_attendee(&draft("", "", "")).unwrap_err();
        assert_eq!(err.message, "Nome não pode estar vazio");
    }

    #[test]
    fn rejects_name_with_digits() {
        let err = validate_attendee(&draft("Maria 2", "01/02/1990", "Solteiro(a)")).unwrap_err();
        assert_eq!(err.message, "Nome inválido");
    }

    #[test]
    fn rejects_name_with_punctuation() {
        let err = validate_attendee(&draft("Maria-José", "01/02/1990", "Solteiro(a)")).unwrap_err();
        assert_eq!(err.message, "Nome inválido");
    }

    #[test]
    fn rejects_empty_birth_date() {
        let err = validate_attendee(&draft("Maria", "", "Solteiro(a)")).unwrap_err();
        assert_eq!(err.message, "Data de nascimento não pode estar vazia");
    }

    #[test]
    fn rejects_malformed_birth_date() {
        for bad in ["1/2/1990", "01-02-1990", "01/02/90", "2020/01/02", "aa/bb/cccc"] {
            let err = validate_attendee(&draft("Maria", bad, "Solteiro(a)")).unwrap_err();
            assert_eq!(err.message, "Data de nascimento inválida", "input: {bad}");
        }
    }

    #[test]
    fn accepts_shape_valid_but_impossible_date() {
        // Only the textual shape is checked locally.
        assert!(validate_attendee(&draft("Maria", "99/99/9999", "Solteiro(a)")).is_ok());
    }

    #[test]
    fn rejects_empty_marital_status() {
        let err = validate_attendee(&draft("Maria", "01/02/1990", "")).unwrap_err();
        assert_eq!(err.message, "Situação não pode estar vazio");
    }

    #[test]
    fn rejects_unknown_marital_status() {
        let err = validate_attendee(&draft("Maria", "01/02/1990", "Casado")).unwrap_err();
        assert_eq!(err.message, "Situação inválido");
    }

    #[test]
    fn empty_order_cannot_advance() {
        let err = check_order_not_empty(&[]).unwrap_err();
        assert_eq!(err.message, "Adicione ingressos na lista para poder avançar");
    }

    #[test]
    fn non_empty_order_advances() {
        let attendee = Attendee::from_draft(1, &draft("Maria", "01/02/1990", "Solteiro(a)"));
        assert!(check_order_not_empty(&[attendee]).is_ok());
    }
}
