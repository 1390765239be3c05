//! REST API client module for the EbookHub backend.
//!
//! This module provides the `ApiClient` for talking to the EbookHub
//! API: the unauthenticated login/signup exchanges, the authenticated
//! request executor with one-shot credential renewal, and typed
//! wrappers over the book, chapter, and reader-interaction endpoints.
//!
//! The API uses JWT bearer token authentication; an expired access
//! token answers 401 and is exchanged transparently via the refresh
//! endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, SessionEvent};
pub use error::ApiError;
