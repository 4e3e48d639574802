//! Error types for adapter operations.
//!
//! Backends report failures as [`QueryError`], which carries an adapter
//! [`ErrorCode`], a message, and (when the failure came from the backend
//! itself) the backend's native code. The public facades never hand a
//! `QueryError` to callers: it is flattened into the envelope's
//! [`ErrorInfo`](crate::response::ErrorInfo) at the boundary.
//!
//! # Error Codes
//!
//! Adapter codes follow the pattern `FM{category}{number}`:
//! - 1xxx: Query errors (not found, misuse of the builder chain)
//! - 3xxx: Backend access errors (connection, permissions, auth)
//! - 5xxx: Execution errors (timeout, aborted batches)
//! - 6xxx: Data errors (encoding/decoding documents)
//! - 7xxx: Configuration errors
//! - 8xxx: Object storage errors
//! - 9xxx: Internal errors
//!
//! The single-row "not found" case is the exception: it always reports the
//! PostgREST sentinel [`NOT_FOUND_SENTINEL`] so callers written against a
//! Supabase client keep working.
//!
//! ```rust
//! use fixmate_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::not_found("complaints");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! assert_eq!(err.code.code(), "PGRST116");
//!
//! let err = QueryError::unscoped_mutation("complaints", "delete");
//! assert_eq!(err.code.code(), "FM1003");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for adapter operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Code reported for "no matching row" in single-row mode.
pub const NOT_FOUND_SENTINEL: &str = "PGRST116";

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Query errors (1xxx)
    /// No row matched a single-row request.
    RecordNotFound = 1001,
    /// Update or delete without any filter.
    UnscopedMutation = 1003,
    /// Insert or update without a payload.
    MissingPayload = 1004,
    /// Payload is not a record or list of records.
    InvalidPayload = 1005,
    /// Two different mutations were chained on one builder.
    ConflictingOperation = 1006,

    // Backend access errors (3xxx)
    /// Backend could not be reached.
    ConnectionFailed = 3001,
    /// Backend refused the operation.
    PermissionDenied = 3002,
    /// Credentials were rejected.
    AuthenticationFailed = 3004,
    /// Operation needs a signed-in principal.
    NotAuthenticated = 3006,

    // Execution errors (5xxx)
    /// Backend call did not finish in time.
    QueryTimeout = 5001,
    /// General backend failure.
    BackendError = 5005,
    /// Atomic batch was rejected as a whole.
    BatchAborted = 5006,

    // Data errors (6xxx)
    /// Encoding a value for the backend failed.
    SerializationError = 6002,
    /// Decoding a backend response failed.
    DeserializationError = 6003,

    // Configuration errors (7xxx)
    /// Invalid configuration.
    InvalidConfiguration = 7001,
    /// Backend does not support the operation.
    Unsupported = 7002,

    // Storage errors (8xxx)
    /// Object storage failure.
    StorageError = 8001,

    // Internal errors (9xxx)
    /// Internal error.
    Internal = 9001,
}

impl ErrorCode {
    /// Get the code string (e.g., "FM1003").
    pub fn code(&self) -> String {
        match self {
            Self::RecordNotFound => NOT_FOUND_SENTINEL.to_string(),
            _ => format!("FM{}", *self as u16),
        }
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "Row not found",
            Self::UnscopedMutation => "Mutation without filters",
            Self::MissingPayload => "Missing payload",
            Self::InvalidPayload => "Invalid payload",
            Self::ConflictingOperation => "Conflicting operations",
            Self::ConnectionFailed => "Backend connection failed",
            Self::PermissionDenied => "Permission denied",
            Self::AuthenticationFailed => "Authentication failed",
            Self::NotAuthenticated => "Not logged in",
            Self::QueryTimeout => "Backend call timed out",
            Self::BackendError => "Backend error",
            Self::BatchAborted => "Batch aborted",
            Self::SerializationError => "Serialization error",
            Self::DeserializationError => "Deserialization error",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Unsupported => "Unsupported operation",
            Self::StorageError => "Storage error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The collection involved.
    pub collection: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur during adapter operations.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The adapter error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Code reported by the backend itself (e.g. `permission-denied`).
    pub backend_code: Option<String>,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backend_code {
            Some(backend) => write!(f, "[{}/{}] {}", self.code.code(), backend, self.message),
            None => write!(f, "[{}] {}", self.code.code(), self.message),
        }
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend_code: None,
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the backend's native error code.
    pub fn with_backend_code(mut self, code: impl Into<String>) -> Self {
        self.backend_code = Some(code.into());
        self
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Set the collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.context.collection = Some(collection.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a "row not found" error for single-row reads.
    pub fn not_found(collection: impl Into<String>) -> Self {
        Self::new(ErrorCode::RecordNotFound, "Row not found").with_collection(collection)
    }

    /// Create an error for an update/delete chained without filters.
    pub fn unscoped_mutation(collection: impl Into<String>, operation: &str) -> Self {
        let collection = collection.into();
        Self::new(
            ErrorCode::UnscopedMutation,
            format!(
                "Refusing to {} every document in '{}' without a filter",
                operation, collection
            ),
        )
        .with_collection(&collection)
        .with_context(operation)
        .with_help("Chain eq()/in_() to scope the mutation, or allow_unscoped() to confirm it")
    }

    /// Create an error for two different mutations on one builder.
    pub fn conflicting_operation(first: &str, second: &str) -> Self {
        Self::new(
            ErrorCode::ConflictingOperation,
            format!("Cannot {} a query that already performs {}", second, first),
        )
        .with_context(second)
    }

    /// Create a missing payload error.
    pub fn missing_payload(operation: &str) -> Self {
        Self::new(
            ErrorCode::MissingPayload,
            format!("{} requires a payload", operation),
        )
        .with_context(operation)
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPayload, message)
    }

    /// Create an error passed through unchanged from the backend.
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BackendError, message).with_backend_code(code)
    }

    /// Create a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::ConnectionFailed, format!("Connection error: {}", message))
    }

    /// Create an authentication error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthenticationFailed, message)
    }

    /// Create an error for operations that need a signed-in user.
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated, "Not logged in")
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::new(
            ErrorCode::QueryTimeout,
            format!("Backend call timed out after {}ms", duration_ms),
        )
    }

    /// Create a batch error; nothing in the batch was applied.
    pub fn batch_aborted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BatchAborted, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::DeserializationError,
            format!("Failed to decode backend response: {}", message),
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::Unsupported,
            format!("{} is not supported by this backend", operation),
        )
        .with_context(&operation)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::QueryTimeout
    }

    /// Check if this error was caused by misuse of the builder chain.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnscopedMutation
                | ErrorCode::ConflictingOperation
                | ErrorCode::MissingPayload
                | ErrorCode::InvalidPayload
        )
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConnectionFailed | ErrorCode::QueryTimeout
        )
    }

    /// The code callers see in the envelope: the backend's own code when
    /// there is one, the adapter code otherwise.
    pub fn public_code(&self) -> String {
        self.backend_code
            .clone()
            .unwrap_or_else(|| self.code.code())
    }

    /// Display the full error with context.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.public_code(), self.message);

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref collection) = self.context.collection {
            output.push_str(&format!("  → Collection: {}\n", collection));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::serialization(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::RecordNotFound.code(), "PGRST116");
        assert_eq!(ErrorCode::UnscopedMutation.code(), "FM1003");
        assert_eq!(ErrorCode::NotAuthenticated.code(), "FM3006");
        assert_eq!(ErrorCode::QueryTimeout.code(), "FM5001");
    }

    #[test]
    fn test_not_found_error() {
        let err = QueryError::not_found("complaints");
        assert!(err.is_not_found());
        assert_eq!(err.message, "Row not found");
        assert_eq!(err.context.collection, Some("complaints".to_string()));
    }

    #[test]
    fn test_backend_code_passes_through() {
        let err = QueryError::backend("permission-denied", "Missing or insufficient permissions.");
        assert_eq!(err.public_code(), "permission-denied");
        assert_eq!(err.message, "Missing or insufficient permissions.");
        assert_eq!(
            err.to_string(),
            "[FM5005/permission-denied] Missing or insufficient permissions."
        );
    }

    #[test]
    fn test_misuse_errors() {
        assert!(QueryError::unscoped_mutation("users", "update").is_misuse());
        assert!(QueryError::conflicting_operation("update", "delete").is_misuse());
        assert!(QueryError::missing_payload("insert").is_misuse());
        assert!(!QueryError::timeout(10).is_misuse());
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::unscoped_mutation("complaints", "delete");
        let output = err.display_full();
        assert!(output.contains("FM1003"));
        assert!(output.contains("complaints"));
        assert!(output.contains("Help"));
    }

    #[test]
    fn test_display_full_names_field() {
        let err = QueryError::invalid_payload("document id 'a/b' cannot contain '/'")
            .with_collection("complaints")
            .with_field("id");
        assert_eq!(err.context.field.as_deref(), Some("id"));
        assert!(err.display_full().contains("→ Field: id"));
    }

    #[test]
    fn test_timeout_is_connection_error() {
        let err = QueryError::timeout(5000);
        assert!(err.is_timeout());
        assert!(err.is_connection_error());
        assert!(err.message.contains("5000"));
    }
}
