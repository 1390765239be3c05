//! Client library for the EbookHub book publishing platform.
//!
//! The heart of the crate is [`ApiClient`], an authenticated request
//! layer over the EbookHub REST API. It attaches a bearer credential to
//! every call, detects expiry (HTTP 401), silently renews the access
//! credential once via the refresh endpoint, retries the original call,
//! and tears the session down when renewal is impossible.
//!
//! Credentials live in an injectable [`TokenStore`]; pick
//! [`FileTokenStore`] or [`KeyringTokenStore`] for persistence across
//! restarts, or [`MemoryTokenStore`] for tests and ephemeral sessions.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ebookhub_client::{ApiClient, Config, MemoryTokenStore, TokenStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store = Arc::new(MemoryTokenStore::new());
//! let client = ApiClient::new(&config, store.clone())?;
//!
//! let tokens = client.login("reader1", "hunter2").await?;
//! store.write(Some(&tokens.access), Some(&tokens.refresh))?;
//!
//! let page = client.fetch_books(None).await?;
//! println!("{} books", page.count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, SessionEvent};
pub use auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, Session, TokenStore};
pub use config::Config;
