//! Authenticated API client for the EbookHub backend.
//!
//! This module implements the session client: every authenticated call
//! reads the access token from the injected `TokenStore`, and a 401
//! answer triggers exactly one silent renewal followed by one retry of
//! the original call. When renewal is impossible the session is
//! terminated and subscribers are notified.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::auth::TokenStore;
use crate::config::Config;
use crate::models::{Author, Book, BookPage, Bookmark, Chapter, Comment, Genre, Love, Rating};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Capacity of the session event channel. Events are tiny and
/// subscribers are expected to drain them promptly.
const EVENT_CHANNEL_CAPACITY: usize = 16;

const LOGIN_PATH: &str = "/login/";
const SIGNUP_PATH: &str = "/signup/";
const REFRESH_PATH: &str = "/api/token/refresh/";

/// Lifecycle notifications emitted by the client.
///
/// The hosting application subscribes via [`ApiClient::subscribe`] and
/// reacts to `Invalidated` by returning to its unauthenticated state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session was terminated; both credentials have been cleared.
    Invalidated,
}

/// Credential pair issued by a successful login.
///
/// The client does not write these into the store itself - that is the
/// caller's decision, matching the login flow where the UI may inspect
/// the response before committing to a session.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// API client for EbookHub.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the renewal lock and event channel are shared so all
/// clones coordinate on a single in-flight renewal.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    renewal: Arc<Mutex<()>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Create a new API client against the configured base URL.
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http,
            base_url: config.api_url().to_string(),
            store,
            renewal: Arc::new(Mutex::new(())),
            events,
        })
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether the store currently holds an access credential.
    pub fn is_logged_in(&self) -> bool {
        self.store.read().is_authenticated()
    }

    // ===== Unauthenticated path =====

    /// Issue a call with no credential attached. Used for the exchanges
    /// that establish the first credential pair.
    pub async fn call_unauthenticated(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(ref body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::into_body(response).await
    }

    /// Log in with a username or email address.
    ///
    /// On success the server issues a fresh credential pair. Write it
    /// into the store to start an authenticated session.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = json!({ "username": identifier, "password": password });
        let value = self
            .call_unauthenticated(LOGIN_PATH, Method::POST, Some(body))
            .await?;
        serde_json::from_value(value).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Create a new account. The backend answers 201 with a status
    /// message; it does not issue credentials, so follow with `login`.
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
        full_name: &str,
        role: &str,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "email": email,
            "username": username,
            "password": password,
            "full_name": full_name,
            "role": role,
        });
        self.call_unauthenticated(SIGNUP_PATH, Method::POST, Some(body))
            .await
    }

    // ===== Authenticated executor =====

    /// Issue an authenticated call, renewing the access credential once
    /// if the server reports it expired.
    ///
    /// The per-call sequence is strictly ordered: attempt, then (only
    /// on a 401) renewal, then one retry. A failure of the retry is
    /// surfaced as [`ApiError::RequestRejected`] - there is never a
    /// second renewal for the same call. A failed renewal terminates
    /// the session and surfaces [`ApiError::SessionExpired`].
    ///
    /// Success yields the parsed JSON body, or an empty object for a
    /// 204 No Content answer.
    pub async fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let access = self
            .store
            .read()
            .access
            .ok_or(ApiError::NoAccessCredential)?;

        let response = self.send(&method, path, body.as_ref(), &access).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_body(response).await;
        }

        debug!(path, "access credential rejected, renewing");
        let fresh = match self.renew_after(Some(&access)).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "credential renewal failed, terminating session");
                self.terminate();
                return Err(ApiError::SessionExpired);
            }
        };

        let retry = self.send(&method, path, body.as_ref(), &fresh).await?;
        Self::into_body(retry).await
    }

    /// Convenience GET returning a deserialized body.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.execute(path, Method::GET, None).await?;
        serde_json::from_value(value).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Convenience POST returning a deserialized body.
    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        let value = self.execute(path, Method::POST, Some(body)).await?;
        serde_json::from_value(value).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        access: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url).bearer_auth(access);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Check the status and parse the body, mapping 204 and empty
    /// bodies to an empty JSON object.
    async fn into_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&text).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    // ===== Renewal coordinator =====

    /// Exchange the renewal credential for a fresh access credential.
    ///
    /// Goes through its own bare HTTP call rather than `execute`, since
    /// it must work precisely when the access credential is invalid. On
    /// success the store is updated; the renewal credential itself is
    /// left untouched, as the refresh endpoint rotates only the access
    /// token.
    pub async fn renew(&self) -> Result<String, ApiError> {
        self.renew_after(None).await
    }

    /// Single-flight renewal. `stale` is the access credential that
    /// observed the 401; if the store holds a different one by the time
    /// the renewal lock is acquired, a concurrent call already renewed
    /// and that result is reused instead of issuing a second exchange.
    async fn renew_after(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.renewal.lock().await;

        if let Some(stale) = stale {
            if let Some(current) = self.store.read().access {
                if current != stale {
                    debug!("reusing access credential from concurrent renewal");
                    return Ok(current);
                }
            }
        }

        let refresh = self
            .store
            .read()
            .refresh
            .ok_or(ApiError::NoRenewalCredential)?;

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(|err| ApiError::RenewalFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RenewalFailed(format!(
                "{status}: {}",
                ApiError::server_message(&body)
            )));
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|err| ApiError::RenewalFailed(err.to_string()))?;

        self.store
            .write(Some(&parsed.access), None)
            .map_err(ApiError::Store)?;
        info!("access credential renewed");
        Ok(parsed.access)
    }

    // ===== Session terminator =====

    /// Clear the credential store and notify subscribers that the
    /// session is gone. Idempotent: terminating an already-empty
    /// session is a no-op apart from the notification.
    pub fn terminate(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear credential store");
        }
        let _ = self.events.send(SessionEvent::Invalidated);
        info!("session terminated");
    }

    // ===== Typed endpoints =====

    /// Fetch one page of the book catalog.
    pub async fn fetch_books(&self, page: Option<u32>) -> Result<BookPage, ApiError> {
        let path = match page {
            Some(page) => format!("/readers/books/?page={page}"),
            None => "/readers/books/".to_string(),
        };
        self.get(&path).await
    }

    /// Fetch one book with its chapter list.
    pub async fn fetch_book(&self, book_id: i64) -> Result<Book, ApiError> {
        self.get(&format!("/books/{book_id}/")).await
    }

    /// Fetch the content of one chapter.
    pub async fn fetch_chapter(&self, book_id: i64, chapter_id: i64) -> Result<Chapter, ApiError> {
        self.get(&format!("/readers/books/{book_id}/c/{chapter_id}/"))
            .await
    }

    pub async fn fetch_author(&self, author_id: i64) -> Result<Author, ApiError> {
        self.get(&format!("/authors/{author_id}/")).await
    }

    pub async fn fetch_genre(&self, genre_id: i64) -> Result<Genre, ApiError> {
        self.get(&format!("/genres/{genre_id}/")).await
    }

    /// Fetch all books published by an author.
    pub async fn fetch_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, ApiError> {
        self.get(&format!("/writers/authors/{author_id}/books/"))
            .await
    }

    /// List the loves on a book.
    pub async fn fetch_loves(&self, book_id: i64) -> Result<Vec<Love>, ApiError> {
        self.get(&format!("/readers/books/{book_id}/loves/")).await
    }

    /// List the comments on a book.
    pub async fn fetch_comments(&self, book_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.get(&format!("/readers/books/{book_id}/comments/"))
            .await
    }

    /// Love a book on behalf of a user. The backend rejects a second
    /// love from the same user with 400.
    pub async fn love_book(&self, user_id: i64, book_id: i64) -> Result<Love, ApiError> {
        let body = json!({ "user": user_id, "book": book_id });
        self.post(&format!("/readers/books/{book_id}/loves/"), body)
            .await
    }

    /// Bookmark a book on behalf of a user.
    pub async fn bookmark_book(&self, user_id: i64, book_id: i64) -> Result<Bookmark, ApiError> {
        let body = json!({ "user": user_id, "book": book_id });
        self.post(&format!("/readers/books/{book_id}/bookmarks/"), body)
            .await
    }

    /// Rate a book from 0 to 5. A repeat rating by the same user
    /// updates the existing row.
    pub async fn rate_book(
        &self,
        user_id: i64,
        book_id: i64,
        rating: f64,
    ) -> Result<Rating, ApiError> {
        let body = json!({ "user": user_id, "book": book_id, "rating": rating });
        self.post(&format!("/readers/books/{book_id}/ratings/"), body)
            .await
    }

    /// Leave a comment on a book.
    pub async fn comment_book(
        &self,
        user_id: i64,
        book_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError> {
        let body = json!({ "user": user_id, "book": book_id, "content": content });
        self.post(&format!("/readers/books/{book_id}/comments/"), body)
            .await
    }

    /// Fork a forkable book into the caller's library.
    pub async fn fork_book(&self, book_id: i64) -> Result<Value, ApiError> {
        self.execute(
            &format!("/writers/books/{book_id}/fork/"),
            Method::POST,
            Some(json!({})),
        )
        .await
    }
}
