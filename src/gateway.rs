//! Remote gateway traits and the HTTP implementation.
//!
//! Every remote collaborator is a trait returning boxed futures, so reducers
//! can hold them as `Arc<dyn Trait>` and tests can substitute mocks without
//! touching the network. The HTTP implementation is a thin mapping from the
//! backend's REST surface to typed results.

use crate::config::ApiConfig;
use crate::types::{
    CpfValidation, LoginRequest, LoginResponse, PaymentRequest, RegisterRequest, TicketDraft,
    TicketRecord, UserDraft, UserRecord, ValidateTicketRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by all gateway calls.
pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send>>;

/// Shown whenever the backend cannot be reached at all.
pub const SERVICE_UNAVAILABLE: &str = "Serviço indisponível, contate um administrador.";

/// Failure of a gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// The request never produced a response (DNS, refused, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// Transport failures get the generic "service unavailable" treatment;
    /// status failures keep their operation-specific message.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Account and session endpoints.
pub trait AccountGateway: Send + Sync {
    /// Checks whether a CPF is known and whether it has completed first
    /// access. A non-success status means the CPF is not recognized.
    fn validate_cpf(&self, cpf: &str) -> GatewayFuture<CpfValidation>;

    /// Completes first access by setting a password and e-mail.
    fn register_first_access(&self, request: &RegisterRequest) -> GatewayFuture<()>;

    /// Exchanges credentials for a session token and role.
    fn login(&self, request: &LoginRequest) -> GatewayFuture<LoginResponse>;
}

/// Payment and ticket validation endpoints.
pub trait PaymentGateway: Send + Sync {
    /// Submits an order for payment. Resolves `Ok` only when the backend
    /// confirms with 201.
    fn submit_payment(&self, request: &PaymentRequest, token: &str) -> GatewayFuture<()>;

    /// Checks a scanned ticket code. Resolves `Ok` only when the backend
    /// confirms with 200.
    fn validate_ticket(&self, ticket_id: &str, token: &str) -> GatewayFuture<()>;
}

/// A remote REST resource with full CRUD.
///
/// Implementors pin down the collection paths so one HTTP implementation
/// covers every resource.
pub trait Entity: Clone + std::fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type as the backend hands it out.
    type Id: Clone + PartialEq + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static;
    /// Payload for create and update calls.
    type Draft: Clone + std::fmt::Debug + Serialize + Send + Sync + 'static;

    /// Collection path for list, update and delete, e.g. `/user/`.
    const COLLECTION: &'static str;
    /// Create path; some resources use a dedicated action path.
    const CREATE: &'static str;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;
}

impl Entity for UserRecord {
    type Id = String;
    type Draft = UserDraft;

    const COLLECTION: &'static str = "/user/";
    const CREATE: &'static str = "/user/";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for TicketRecord {
    type Id = String;
    type Draft = TicketDraft;

    const COLLECTION: &'static str = "/ingresso/";
    const CREATE: &'static str = "/ingresso/generate/";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// CRUD over one remote resource, authorized by a session token.
pub trait CrudGateway<T: Entity>: Send + Sync {
    /// Fetches the whole collection.
    fn list(&self, token: &str) -> GatewayFuture<Vec<T>>;

    /// Creates a record and returns it as the backend stored it.
    fn create(&self, draft: &T::Draft, token: &str) -> GatewayFuture<T>;

    /// Replaces the record with the given id.
    fn update(&self, id: &T::Id, draft: &T::Draft, token: &str) -> GatewayFuture<T>;

    /// Deletes the record with the given id.
    fn delete(&self, id: &T::Id, token: &str) -> GatewayFuture<()>;
}

/// HTTP gateway backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway with an already-configured client.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds the client from configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the TLS backend cannot initialize.
    pub fn from_config(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::new(client, config.base_url.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn auth(token: &str) -> String {
        format!("Token {token}")
    }
}

fn require_success(response: &reqwest::Response) -> Result<(), GatewayError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(GatewayError::Status(response.status().as_u16()))
    }
}

impl AccountGateway for HttpGateway {
    fn validate_cpf(&self, cpf: &str) -> GatewayFuture<CpfValidation> {
        let client = self.client.clone();
        let url = self.url(&format!("/user/validate_cpf/{cpf}/"));
        Box::pin(async move {
            let response = client.post(url).send().await?;
            require_success(&response)?;
            Ok(response.json::<CpfValidation>().await?)
        })
    }

    fn register_first_access(&self, request: &RegisterRequest) -> GatewayFuture<()> {
        let client = self.client.clone();
        let url = self.url("/user/primeiro_acesso/");
        let body = request.clone();
        Box::pin(async move {
            let response = client.post(url).json(&body).send().await?;
            require_success(&response)
        })
    }

    fn login(&self, request: &LoginRequest) -> GatewayFuture<LoginResponse> {
        let client = self.client.clone();
        let url = self.url("/user/login/");
        let body = request.clone();
        Box::pin(async move {
            let response = client.post(url).json(&body).send().await?;
            require_success(&response)?;
            Ok(response.json::<LoginResponse>().await?)
        })
    }
}

impl PaymentGateway for HttpGateway {
    fn submit_payment(&self, request: &PaymentRequest, token: &str) -> GatewayFuture<()> {
        let client = self.client.clone();
        let url = self.url("/ingresso/payment/");
        let auth = Self::auth(token);
        let body = request.clone();
        Box::pin(async move {
            let response = client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .json(&body)
                .send()
                .await?;
            // Payment is confirmed only by 201; anything else did not charge.
            if response.status() == reqwest::StatusCode::CREATED {
                Ok(())
            } else {
                Err(GatewayError::Status(response.status().as_u16()))
            }
        })
    }

    fn validate_ticket(&self, ticket_id: &str, token: &str) -> GatewayFuture<()> {
        let client = self.client.clone();
        let url = self.url("/ingresso/validate/");
        let auth = Self::auth(token);
        let body = ValidateTicketRequest {
            ticket_id: ticket_id.to_owned(),
        };
        Box::pin(async move {
            let response = client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .json(&body)
                .send()
                .await?;
            if response.status() == reqwest::StatusCode::OK {
                Ok(())
            } else {
                Err(GatewayError::Status(response.status().as_u16()))
            }
        })
    }
}

impl<T: Entity> CrudGateway<T> for HttpGateway {
    fn list(&self, token: &str) -> GatewayFuture<Vec<T>> {
        let client = self.client.clone();
        let url = self.url(T::COLLECTION);
        let auth = Self::auth(token);
        Box::pin(async move {
            let response = client
                .get(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .send()
                .await?;
            require_success(&response)?;
            Ok(response.json::<Vec<T>>().await?)
        })
    }

    fn create(&self, draft: &T::Draft, token: &str) -> GatewayFuture<T> {
        let client = self.client.clone();
        let url = self.url(T::CREATE);
        let auth = Self::auth(token);
        let body = draft.clone();
        Box::pin(async move {
            let response = client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .json(&body)
                .send()
                .await?;
            require_success(&response)?;
            Ok(response.json::<T>().await?)
        })
    }

    fn update(&self, id: &T::Id, draft: &T::Draft, token: &str) -> GatewayFuture<T> {
        let client = self.client.clone();
        let url = self.url(&format!("{}{}/", T::COLLECTION, id));
        let auth = Self::auth(token);
        let body = draft.clone();
        Box::pin(async move {
            let response = client
                .put(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .json(&body)
                .send()
                .await?;
            require_success(&response)?;
            Ok(response.json::<T>().await?)
        })
    }

    fn delete(&self, id: &T::Id, token: &str) -> GatewayFuture<()> {
        let client = self.client.clone();
        let url = self.url(&format!("{}{}/", T::COLLECTION, id));
        let auth = Self::auth(token);
        Box::pin(async move {
            let response = client
                .delete(url)
                .header(reqwest::header::AUTHORIZATION, auth)
                .send()
                .await?;
            require_success(&response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let gateway = HttpGateway::new(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(gateway.url("/user/"), "http://localhost:8000/user/");
    }

    #[test]
    fn auth_header_uses_token_scheme() {
        assert_eq!(HttpGateway::auth("abc123"), "Token abc123");
    }

    #[test]
    fn transport_and_status_errors_are_distinguished() {
        let status = GatewayError::Status(500);
        assert!(!status.is_transport());
    }

    #[test]
    fn entity_paths_match_backend_routes() {
        assert_eq!(<UserRecord as Entity>::COLLECTION, "/user/");
        assert_eq!(<UserRecord as Entity>::CREATE, "/user/");
        assert_eq!(<TicketRecord as Entity>::COLLECTION, "/ingresso/");
        assert_eq!(<TicketRecord as Entity>::CREATE, "/ingresso/generate/");
    }
}
