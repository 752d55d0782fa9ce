//! Environment-driven configuration.

use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use std::env;
use std::sync::Arc;

/// Backend API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the ticketing backend.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Session persistence settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// `file` or `memory`.
    pub backend: String,
    /// Path used by the file backend.
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_owned(),
            path: ".ingressou-session.json".to_owned(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Backend API settings.
    pub api: ApiConfig,
    /// Session persistence settings.
    pub session: SessionConfig,
}

impl Config {
    /// Reads configuration from environment variables, falling back to
    /// defaults when a variable is missing or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: ApiConfig {
                base_url: env::var("API_BASE_URL").unwrap_or(defaults.api.base_url),
                timeout_secs: env::var("API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.api.timeout_secs),
            },
            session: SessionConfig {
                backend: env::var("SESSION_BACKEND").unwrap_or(defaults.session.backend),
                path: env::var("SESSION_PATH").unwrap_or(defaults.session.path),
            },
        }
    }

    /// Builds the session store named by [`SessionConfig::backend`].
    /// Unrecognized names fall back to the file backend.
    #[must_use]
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        match self.session.backend.as_str() {
            "memory" => Arc::new(MemorySessionStore::default()),
            _ => Arc::new(FileSessionStore::new(self.session.path.clone())),
        }
    }
}
