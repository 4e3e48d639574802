//! Error types for the in-memory backend.

use fixmate_query::QueryError;
use thiserror::Error;

/// Result type for in-memory backend operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors raised by the in-memory backend.
///
/// Each variant carries the code the hosted Firebase services report for
/// the same condition, so callers see identical codes in either backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Update of a document that does not exist.
    #[error("No document to update: {0}")]
    MissingDocument(String),

    /// Sign-up with an e-mail that already has an account.
    #[error("The email address is already in use by another account.")]
    EmailInUse(String),

    /// Sign-in with an unknown e-mail.
    #[error("There is no user record corresponding to this identifier.")]
    UserNotFound(String),

    /// Sign-in with a wrong password.
    #[error("The password is invalid or the user does not have a password.")]
    WrongPassword,

    /// Password shorter than six characters.
    #[error("Password should be at least 6 characters")]
    WeakPassword,

    /// Malformed e-mail address.
    #[error("The email address is badly formatted.")]
    InvalidEmail(String),

    /// A failure scheduled with `fail_next`.
    #[error("{message}")]
    Injected {
        /// Backend code to report.
        code: String,
        /// Message to report.
        message: String,
    },
}

impl MemoryError {
    /// The code the hosted service reports for this condition.
    pub fn code(&self) -> &str {
        match self {
            Self::MissingDocument(_) => "not-found",
            Self::EmailInUse(_) => "auth/email-already-in-use",
            Self::UserNotFound(_) => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::WeakPassword => "auth/weak-password",
            Self::InvalidEmail(_) => "auth/invalid-email",
            Self::Injected { code, .. } => code,
        }
    }

    /// Create an injected failure.
    pub fn injected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Injected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this is an auth error.
    pub fn is_auth_error(&self) -> bool {
        self.code().starts_with("auth/")
    }
}

impl From<MemoryError> for QueryError {
    fn from(err: MemoryError) -> Self {
        let code = err.code().to_string();
        let message = err.to_string();
        match err {
            MemoryError::UserNotFound(_)
            | MemoryError::WrongPassword
            | MemoryError::InvalidEmail(_) => {
                QueryError::authentication_failed(message).with_backend_code(code)
            }
            MemoryError::MissingDocument(_) => {
                QueryError::batch_aborted(message).with_backend_code(code)
            }
            _ => QueryError::backend(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixmate_query::ErrorCode;

    #[test]
    fn test_error_codes() {
        assert_eq!(MemoryError::WrongPassword.code(), "auth/wrong-password");
        assert!(MemoryError::WeakPassword.is_auth_error());
        assert!(!MemoryError::MissingDocument("c/1".into()).is_auth_error());
    }

    #[test]
    fn test_error_display() {
        let err = MemoryError::MissingDocument("complaints/c1".to_string());
        assert_eq!(err.to_string(), "No document to update: complaints/c1");
    }

    #[test]
    fn test_into_query_error() {
        let err: QueryError = MemoryError::WrongPassword.into();
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
        assert_eq!(err.public_code(), "auth/wrong-password");

        let err: QueryError = MemoryError::injected("permission-denied", "Missing permissions").into();
        assert_eq!(err.public_code(), "permission-denied");
        assert_eq!(err.message, "Missing permissions");
    }
}
