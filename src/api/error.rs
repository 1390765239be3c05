use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No access credential in the store; the call was never sent.
    #[error("No access credential - log in first")]
    NoAccessCredential,

    /// No renewal credential in the store; renewal was never attempted.
    #[error("No renewal credential - the session cannot be renewed")]
    NoRenewalCredential,

    /// The server declined the call for a reason other than an expired
    /// credential, or declined it again after a successful renewal.
    #[error("Request rejected ({status}): {message}")]
    RequestRejected { status: StatusCode, message: String },

    /// The renewal call itself failed.
    #[error("Credential renewal failed: {0}")]
    RenewalFailed(String),

    /// Renewal was impossible; the session has been terminated.
    #[error("Session expired - log in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential store error: {0}")]
    Store(anyhow::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Message used when the error body carries no recognizable field
const GENERIC_MESSAGE: &str = "request failed";

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data.
    /// The cut is backed off to a char boundary so multibyte bodies
    /// (HTML error pages, non-ASCII text) never split a character.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Pull the human-readable message out of an error body.
    ///
    /// The backend reports failures as `{"error": ...}` or
    /// `{"detail": ...}`; anything else falls back to the raw
    /// (truncated) body, or a generic message when the body is empty.
    pub fn server_message(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            for key in ["error", "detail"] {
                if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                    return message.to_string();
                }
            }
        }
        if body.trim().is_empty() {
            GENERIC_MESSAGE.to_string()
        } else {
            Self::truncate_body(body)
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::RequestRejected {
            status,
            message: Self::server_message(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_error_field() {
        let body = r#"{"error": "Username already exists"}"#;
        assert_eq!(ApiError::server_message(body), "Username already exists");
    }

    #[test]
    fn message_falls_back_to_detail_field() {
        let body = r#"{"detail": "You have already loved this book."}"#;
        assert_eq!(
            ApiError::server_message(body),
            "You have already loved this book."
        );
    }

    #[test]
    fn message_generic_on_empty_body() {
        assert_eq!(ApiError::server_message(""), "request failed");
        assert_eq!(ApiError::server_message("  "), "request failed");
    }

    #[test]
    fn message_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let message = ApiError::server_message(&body);
        assert!(message.contains("truncated"));
        assert!(message.len() < body.len());
    }

    #[test]
    fn message_truncates_multibyte_bodies_on_char_boundary() {
        // Three-byte characters put the cutoff inside a character
        let body = "あ".repeat(600);
        let message = ApiError::server_message(&body);
        assert!(message.contains("truncated"));
        assert!(message.starts_with('あ'));

        // Same for a long non-ASCII HTML error page without JSON fields
        let html = format!("<html><body>ошибка {}</body></html>", "п".repeat(600));
        let message = ApiError::server_message(&html);
        assert!(message.contains("truncated"));
    }

    #[test]
    fn from_status_carries_status_and_message() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error": "Book not found"}"#);
        match err {
            ApiError::RequestRejected { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Book not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
