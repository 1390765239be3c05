use anyhow::{Context, Result};
use keyring::Entry;
use parking_lot::Mutex;
use tracing::debug;

use super::session::{Session, TokenStore};

const SERVICE_NAME: &str = "ebookhub-client";
const ACCESS_ENTRY: &str = "access-token";
const REFRESH_ENTRY: &str = "refresh-token";

/// Credential store backed by the OS keychain.
///
/// The keychain is consulted once at construction; afterwards reads are
/// served from an in-memory mirror and writes go through to the
/// keychain. Two entries are kept under the `ebookhub-client` service,
/// one per credential.
pub struct KeyringTokenStore {
    session: Mutex<Session>,
}

impl KeyringTokenStore {
    pub fn open() -> Result<Self> {
        let session = Session {
            access: Self::get(ACCESS_ENTRY)?,
            refresh: Self::get(REFRESH_ENTRY)?,
            saved_at: None,
        };
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    fn entry(name: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, name).context("failed to create keyring entry")
    }

    fn get(name: &str) -> Result<Option<String>> {
        match Self::entry(name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err).context("failed to read credential from keychain"),
        }
    }

    fn set(name: &str, value: &str) -> Result<()> {
        Self::entry(name)?
            .set_password(value)
            .context("failed to store credential in keychain")
    }

    fn delete(name: &str) -> Result<()> {
        match Self::entry(name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err).context("failed to delete credential from keychain"),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn read(&self) -> Session {
        self.session.lock().clone()
    }

    fn write(&self, access: Option<&str>, refresh: Option<&str>) -> Result<()> {
        if let Some(access) = access {
            Self::set(ACCESS_ENTRY, access)?;
        }
        if let Some(refresh) = refresh {
            Self::set(REFRESH_ENTRY, refresh)?;
        }
        let mut session = self.session.lock();
        if let Some(access) = access {
            session.access = Some(access.to_string());
        }
        if let Some(refresh) = refresh {
            session.refresh = Some(refresh.to_string());
        }
        session.saved_at = Some(chrono::Utc::now());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Self::delete(ACCESS_ENTRY)?;
        Self::delete(REFRESH_ENTRY)?;
        *self.session.lock() = Session::default();
        debug!("keychain credentials cleared");
        Ok(())
    }
}
