//! Credential storage for EbookHub sessions.
//!
//! This module provides:
//! - `Session`: the access/renewal credential pair for one user
//! - `TokenStore`: injectable storage trait consumed by the API client
//! - `MemoryTokenStore`, `FileTokenStore`: in-memory and on-disk stores
//! - `KeyringTokenStore`: OS-level keychain storage via keyring
//!
//! The store owns the credentials; the client reads them per call and
//! writes back only on a successful renewal.

pub mod credentials;
pub mod session;

pub use credentials::KeyringTokenStore;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
