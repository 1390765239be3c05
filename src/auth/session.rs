use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name inside the config directory
const SESSION_FILE: &str = "session.json";

/// The credential pair for one user session.
///
/// `access` is the short-lived bearer token attached to every
/// authenticated call. `refresh` is the longer-lived token used only to
/// obtain a new access token; once it is gone the session is over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access: Option<String>,
    pub refresh: Option<String>,
    /// Timestamp of the last write, for display and diagnostics only.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether an access credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }

    /// Whether the session can still be renewed.
    pub fn has_refresh(&self) -> bool {
        self.refresh.is_some()
    }

    fn apply(&mut self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(access) = access {
            self.access = Some(access.to_string());
        }
        if let Some(refresh) = refresh {
            self.refresh = Some(refresh.to_string());
        }
        self.saved_at = Some(Utc::now());
    }
}

/// Storage for the session credentials.
///
/// The API client depends on this trait rather than any ambient global,
/// so tests can substitute `MemoryTokenStore` for the persisted stores.
/// `read` never blocks and never fails; `write` updates only the fields
/// that are supplied and persists them; `clear` removes both
/// credentials and is a no-op on an already-empty store.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Session;
    fn write(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-memory credential store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    session: Mutex<Session>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing credential pair.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Session {
        self.session.lock().clone()
    }

    fn write(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()> {
        self.session.lock().apply(access, refresh);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock() = Session::default();
        Ok(())
    }
}

/// File-backed credential store.
///
/// Keeps an in-memory mirror so `read` never touches the disk; writes
/// go through to a JSON file so the session survives a restart.
pub struct FileTokenStore {
    path: PathBuf,
    session: Mutex<Session>,
}

impl FileTokenStore {
    /// Open the store at the default location,
    /// `<config_dir>/ebookhub-client/session.json`.
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Self::open(config_dir.join(crate::config::APP_NAME).join(SESSION_FILE))
    }

    /// Open the store at an explicit path, loading any persisted
    /// session. A missing or unreadable file starts an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = Self::load(&path).unwrap_or_else(|err| {
            debug!(error = %err, path = %path.display(), "no persisted session loaded");
            Session::default()
        });
        Ok(Self {
            path,
            session: Mutex::new(session),
        })
    }

    fn load(path: &Path) -> Result<Session> {
        let contents = std::fs::read_to_string(path).context("failed to read session file")?;
        serde_json::from_str(&contents).context("failed to parse session file")
    }

    fn persist(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents).context("failed to write session file")
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Session {
        self.session.lock().clone()
    }

    fn write(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()> {
        let mut session = self.session.lock();
        session.apply(access, refresh);
        self.persist(&session)
    }

    fn clear(&self) -> Result<()> {
        let mut session = self.session.lock();
        *session = Session::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("failed to remove session file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_partial_write() {
        let store = MemoryTokenStore::new();
        store.write(Some("a1"), Some("r1")).unwrap();

        // Writing only the access field must leave the refresh field alone
        store.write(Some("a2"), None).unwrap();
        let session = store.read();
        assert_eq!(session.access.as_deref(), Some("a2"));
        assert_eq!(session.refresh.as_deref(), Some("r1"));
    }

    #[test]
    fn memory_store_clear_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.write(Some("a1"), Some("r1")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.read(), Session::default());
        store.clear().unwrap();
        assert_eq!(store.read(), Session::default());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.write(Some("a1"), Some("r1")).unwrap();
        drop(store);

        let store = FileTokenStore::open(&path).unwrap();
        let session = store.read();
        assert_eq!(session.access.as_deref(), Some("a1"));
        assert_eq!(session.refresh.as_deref(), Some("r1"));
        assert!(session.saved_at.is_some());
    }

    #[test]
    fn file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.write(Some("a1"), None).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.read(), Session::default());

        // Second clear with no file present must not error
        store.clear().unwrap();
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::open(&path).unwrap();
        assert_eq!(store.read(), Session::default());
    }
}
