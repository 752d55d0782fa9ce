//! Domain types for the Ingressou client.
//!
//! Two families live here: local-only types driving the purchase workflow
//! (attendees never leave the device until payment), and wire records owned
//! by the backend. Wire types keep English field names in Rust and map to the
//! backend's Portuguese JSON keys via serde renames.

use serde::{Deserialize, Serialize};

/// Price of a single ticket, in whole reais. No discount logic exists.
pub const UNIT_PRICE_REAIS: u32 = 100;

/// The two marital statuses the backend accepts, as literal form values.
pub const MARITAL_STATUSES: [&str; 2] = ["Solteiro(a)", "Comprometido(a)"];

/// Mutable edit buffer for the attendee being typed into the purchase form.
///
/// Mutated field by field as the operator fills the form; promoted into an
/// immutable [`Attendee`] once it passes validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttendeeDraft {
    /// Attendee name as typed.
    pub name: String,
    /// Birth date as typed, expected as `dd/mm/yyyy`.
    pub birth_date: String,
    /// Marital status, one of [`MARITAL_STATUSES`].
    pub marital_status: String,
}

/// A validated attendee appended to the current order.
///
/// Immutable once created; `id` is a local 1-based sequence number, not a
/// server identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attendee {
    /// Local sequence number, 1-based, in insertion order.
    pub id: u32,
    /// Attendee name.
    pub name: String,
    /// Birth date, `dd/mm/yyyy`.
    pub birth_date: String,
    /// Marital status, one of [`MARITAL_STATUSES`].
    pub marital_status: String,
}

impl Attendee {
    /// Promotes a draft into an attendee with the given sequence number.
    #[must_use]
    pub fn from_draft(id: u32, draft: &AttendeeDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            birth_date: draft.birth_date.clone(),
            marital_status: draft.marital_status.clone(),
        }
    }
}

/// Total price in reais for an order of `count` attendees.
#[must_use]
pub const fn order_total_reais(count: usize) -> u64 {
    count as u64 * UNIT_PRICE_REAIS as u64
}

/// Backend role attached to a user record and to the login response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular user: buys tickets, sees their own.
    #[default]
    #[serde(rename = "COMUM")]
    Comum,
    /// Administrator: manages users and tickets, validates QR codes.
    #[serde(rename = "ADMIN")]
    Admin,
}

/// Authenticated session. The empty default value means "logged out".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend token, sent as `Authorization: Token <t>`.
    pub token: String,
    /// Whether the session belongs to an administrator.
    pub is_admin: bool,
    /// True only for sessions produced by a successful login.
    pub is_authenticated: bool,
}

impl Session {
    /// Builds an authenticated session from a login response.
    #[must_use]
    pub const fn authenticated(token: String, is_admin: bool) -> Self {
        Self {
            token,
            is_admin,
            is_authenticated: true,
        }
    }

    /// A session is live when it carries a token.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Response of `POST /user/validate_cpf/{cpf}/`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CpfValidation {
    /// Whether this CPF has never set a password.
    #[serde(rename = "primeiro_acesso")]
    pub first_access: bool,
}

/// Body of `POST /user/primeiro_acesso/`.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    /// National id being registered.
    pub cpf: String,
    /// Chosen password.
    pub password: String,
    /// Contact email.
    pub email: String,
}

/// Body of `POST /user/login/`.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    /// National id.
    pub cpf: String,
    /// Password.
    pub password: String,
}

/// Response of `POST /user/login/`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    /// Session token.
    #[serde(default)]
    pub token: String,
    /// Role of the authenticated user.
    pub tipo: Role,
}

/// Body of `POST /ingresso/validate/`.
#[derive(Clone, Debug, Serialize)]
pub struct ValidateTicketRequest {
    /// Ticket id decoded from the QR code.
    #[serde(rename = "ingresso")]
    pub ticket_id: String,
}

/// One payment line item, built from an [`Attendee`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentItem {
    /// Attendee name.
    pub nome: String,
    /// Birth date, `dd/mm/yyyy`.
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    /// Marital status.
    pub situacao: String,
}

impl From<&Attendee> for PaymentItem {
    fn from(attendee: &Attendee) -> Self {
        Self {
            nome: attendee.name.clone(),
            birth_date: attendee.birth_date.clone(),
            situacao: attendee.marital_status.clone(),
        }
    }
}

/// Body of `POST /ingresso/payment/`.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentRequest {
    /// One entry per attendee in the order.
    pub ingressos: Vec<PaymentItem>,
}

/// A user record as owned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Server-assigned identifier.
    pub id: String,
    /// Natural key, unique per user.
    pub cpf: String,
    /// First name.
    #[serde(rename = "first_name")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "last_name")]
    pub last_name: String,
    /// Optional contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional birth date, `dd/mm/yyyy`.
    #[serde(rename = "birthday", default)]
    pub birth_date: Option<String>,
    /// Role.
    pub tipo: Role,
    /// Whether the user still has to set a password.
    #[serde(rename = "is_primeiro_acesso")]
    pub first_access: bool,
}

/// Draft sent to create or update a user (`POST/PUT /user/`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    /// Natural key.
    pub cpf: String,
    /// First name.
    #[serde(rename = "first_name")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "last_name")]
    pub last_name: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional birth date.
    #[serde(rename = "birthday")]
    pub birth_date: Option<String>,
    /// Role.
    pub tipo: Role,
    /// First-access flag.
    #[serde(rename = "is_primeiro_acesso")]
    pub first_access: bool,
}

/// A ticket record as owned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Server-assigned identifier (also the QR payload).
    pub id: String,
    /// Owning user.
    #[serde(rename = "usuario")]
    pub owner: UserRecord,
    /// Attendee name printed on the ticket.
    #[serde(rename = "nome")]
    pub name: String,
    /// Attendee birth date.
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    /// Marital status.
    #[serde(rename = "situacao")]
    pub status: String,
    /// Creation timestamp, backend-formatted.
    #[serde(rename = "created_at")]
    pub created_at: String,
    /// When the ticket was scanned at the gate, if ever.
    #[serde(rename = "utilizado_em", default)]
    pub used_at: Option<String>,
}

/// Draft sent to create or update a ticket (`POST /ingresso/generate/`,
/// `PUT /ingresso/{id}/`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TicketDraft {
    /// CPF of the owning user.
    #[serde(rename = "usuario")]
    pub owner_cpf: String,
    /// Attendee name.
    pub nome: String,
    /// Attendee birth date.
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    /// Marital status.
    pub situacao: String,
}
