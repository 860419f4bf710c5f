//! Persistent session storage.
//!
//! Pages never touch storage directly: the signed-in user is read and
//! written through a [`SessionStore`], as one JSON document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::Session;

/// Read/write boundary for the stored session.
pub trait SessionStore: Send + Sync {
    /// The stored session, `None` if nobody is signed in.
    ///
    /// # Errors
    ///
    /// `SessionCorrupt` when something is stored but cannot be parsed.
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

fn decode(raw: &str) -> Result<Session> {
    serde_json::from_str(raw).map_err(ClientError::SessionCorrupt)
}

/// Session kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured `SESSION_FILE`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.session_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), role = session.role().as_str(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session kept in memory for the life of the process.
///
/// Holds the serialized form so it behaves exactly like persistent storage,
/// unreadable contents included.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw contents, as if written by someone else.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        self.slot().as_deref().map(decode).transpose()
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot() = Some(serde_json::to_string(session)?);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
