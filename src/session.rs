//! Session persistence.
//!
//! The active session (token + role) survives restarts through a
//! [`SessionStore`]. The file backend is the default; the in-memory backend
//! exists for tests and ephemeral runs.

use crate::types::Session;
use std::path::PathBuf;
use std::sync::Mutex;

/// Failure of a session store operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Underlying filesystem failure.
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored session could not be parsed.
    #[error("Session serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence for the active session.
pub trait SessionStore: Send + Sync {
    /// Persists the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backend cannot write.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Loads the stored session. A missing or empty-token session loads as
    /// the logged-out default.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backend cannot read or parse.
    fn load(&self) -> Result<Session, SessionError>;
}

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> Result<Session, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::default());
            }
            Err(err) => return Err(err.into()),
        };
        let session: Session = serde_json::from_str(&contents)?;
        if session.token.is_empty() {
            return Ok(Session::default());
        }
        Ok(session)
    }
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    current: Mutex<Session>,
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = session.clone();
        Ok(())
    }

    fn load(&self) -> Result<Session, SessionError> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.token.is_empty() {
            return Ok(Session::default());
        }
        Ok(current.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        let session = Session::authenticated("tok-1".to_owned(), true);
        store.save(&session).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn missing_file_loads_logged_out_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        let loaded = store.load().unwrap();
        assert!(!loaded.is_logged_in());
    }

    #[test]
    fn empty_token_loads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&Session::default()).unwrap();
        let loaded = store.load().unwrap();
        assert!(!loaded.is_logged_in());
        assert!(!loaded.is_admin);
    }

    #[test]
    fn corrupt_file_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileSessionStore::new(path);
        assert!(matches!(store.load(), Err(SessionError::Serde(_))));
    }

    #[test]
    fn memory_store_round_trips_session() {
        let store = MemorySessionStore::default();
        let session = Session::authenticated("tok-2".to_owned(), false);
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);
    }

    #[test]
    fn memory_store_starts_logged_out() {
        let store = MemorySessionStore::default();
        assert!(!store.load().unwrap().is_logged_in());
    }
}
