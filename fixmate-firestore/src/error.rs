//! Error types for the Firebase REST backend.

use fixmate_query::QueryError;
use serde::Deserialize;
use thiserror::Error;

/// Result type for Firebase REST operations.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Errors that can occur talking to the Firebase REST APIs.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Firestore or Storage rejected the request.
    #[error("{message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Lower-case code, e.g. `permission-denied`.
        code: String,
        /// Message from the service.
        message: String,
    },

    /// Identity Toolkit rejected the request.
    #[error("{message}")]
    Auth {
        /// Service code, e.g. `INVALID_PASSWORD`.
        code: String,
        /// Message from the service.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl FirestoreError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Api { code, .. } => code == "unavailable",
            _ => false,
        }
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == "not-found")
    }

    /// Build an error from a failed Firestore or Storage response body.
    pub fn from_api_body(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
        let (code, message) = match parsed {
            Some(ApiErrorBody { error }) => (
                error
                    .status
                    .map(|s| status_code(&s))
                    .unwrap_or_else(|| http_code(status).to_string()),
                error.message,
            ),
            None => (http_code(status).to_string(), body.trim().to_string()),
        };
        Self::Api {
            status,
            code,
            message,
        }
    }

    /// Build an error from a failed Identity Toolkit response body.
    ///
    /// The service reports `"message": "CODE"` or `"message": "CODE : detail"`.
    pub fn from_auth_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody { error }) => {
                let (code, detail) = match error.message.split_once(" : ") {
                    Some((code, detail)) => (code.trim().to_string(), detail.trim().to_string()),
                    None => (error.message.trim().to_string(), String::new()),
                };
                let message = if detail.is_empty() {
                    code.clone()
                } else {
                    detail
                };
                Self::Auth { code, message }
            }
            Err(_) => Self::from_api_body(status, body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// `PERMISSION_DENIED` -> `permission-denied`.
fn status_code(status: &str) -> String {
    status.to_lowercase().replace('_', "-")
}

fn http_code(status: u16) -> &'static str {
    match status {
        400 => "invalid-argument",
        401 => "unauthenticated",
        403 => "permission-denied",
        404 => "not-found",
        409 => "aborted",
        429 => "resource-exhausted",
        503 => "unavailable",
        504 => "deadline-exceeded",
        _ => "unknown",
    }
}

impl From<FirestoreError> for QueryError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Http(e) => {
                if e.is_timeout() {
                    QueryError::connection(e.to_string()).with_backend_code("deadline-exceeded")
                } else {
                    QueryError::connection(e.to_string())
                }
            }
            FirestoreError::Api { code, message, .. } => {
                if code == "permission-denied" || code == "unauthenticated" {
                    QueryError::permission_denied(message).with_backend_code(code)
                } else {
                    QueryError::backend(code, message)
                }
            }
            FirestoreError::Auth { code, message } => {
                QueryError::authentication_failed(message).with_backend_code(code)
            }
            FirestoreError::Decode(msg) => QueryError::deserialization(msg),
            FirestoreError::Config(msg) => QueryError::configuration(msg),
            FirestoreError::Url(e) => QueryError::configuration(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixmate_query::ErrorCode;

    #[test]
    fn test_api_error_body() {
        let body = r#"{"error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}}"#;
        let err = FirestoreError::from_api_body(403, body);
        match &err {
            FirestoreError::Api { code, message, .. } => {
                assert_eq!(code, "permission-denied");
                assert_eq!(message, "Missing or insufficient permissions.");
            }
            other => panic!("unexpected {:?}", other),
        }

        let query_err: QueryError = err.into();
        assert_eq!(query_err.code, ErrorCode::PermissionDenied);
        assert_eq!(query_err.public_code(), "permission-denied");
    }

    #[test]
    fn test_api_error_without_json() {
        let err = FirestoreError::from_api_body(503, "upstream down\n");
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "upstream down");
    }

    #[test]
    fn test_auth_error_body() {
        let body = r#"{"error": {"code": 400, "message": "INVALID_PASSWORD"}}"#;
        let err: QueryError = FirestoreError::from_auth_body(400, body).into();
        assert_eq!(err.public_code(), "INVALID_PASSWORD");
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);

        let body = r#"{"error": {"code": 400, "message": "WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        let err: QueryError = FirestoreError::from_auth_body(400, body).into();
        assert_eq!(err.public_code(), "WEAK_PASSWORD");
        assert_eq!(err.message, "Password should be at least 6 characters");
    }

    #[test]
    fn test_not_found() {
        let body = r#"{"error": {"code": 404, "message": "No document to update", "status": "NOT_FOUND"}}"#;
        assert!(FirestoreError::from_api_body(404, body).is_not_found());
    }
}
