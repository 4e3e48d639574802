//! The `{ data, error }` envelope and the payloads carried inside it.
//!
//! Both envelope fields always serialize, as `null` when absent, so callers
//! can destructure without existence checks.

use serde::{Deserialize, Serialize};

use crate::document::Record;
use crate::error::QueryError;

/// Error as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorInfo {
    /// Create an error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Set the code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<QueryError> for ErrorInfo {
    fn from(err: QueryError) -> Self {
        Self {
            code: Some(err.public_code()),
            message: err.message,
        }
    }
}

impl From<&QueryError> for ErrorInfo {
    fn from(err: &QueryError) -> Self {
        Self {
            code: Some(err.public_code()),
            message: err.message.clone(),
        }
    }
}

/// Result envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Result data; `None` on failure and for operations without a result.
    pub data: Option<T>,
    /// Error; `None` on success.
    pub error: Option<ErrorInfo>,
}

impl<T> Response<T> {
    /// A successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// A successful response without data.
    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    /// A failed response.
    pub fn err(error: impl Into<ErrorInfo>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    /// Check if the response carries an error.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Check if the response is a success.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, treating an absent error as success.
    pub fn into_result(self) -> Result<Option<T>, ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T> From<Result<Option<T>, QueryError>> for Response<T> {
    fn from(result: Result<Option<T>, QueryError>) -> Self {
        match result {
            Ok(data) => Self { data, error: None },
            Err(err) => Self::err(err),
        }
    }
}

/// Query builder result: one record or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    /// A single record (single-row mode, single-record insert).
    One(Record),
    /// A list of records.
    Many(Vec<Record>),
}

impl Data {
    /// The single record, if this is one.
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Self::One(record) => Some(record),
            Self::Many(_) => None,
        }
    }

    /// The record list, if this is one.
    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            Self::One(_) => None,
            Self::Many(records) => Some(records),
        }
    }

    /// Flatten into a list of records.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }
}

/// Metadata reported for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Display name.
    pub full_name: Option<String>,
}

/// A normalized user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// E-mail address.
    pub email: String,
    /// Role read from the profile record (sign-in only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// User metadata.
    pub user_metadata: UserMetadata,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for backend calls.
    pub access_token: String,
    /// The signed-in user.
    pub user: User,
}

/// Payload of `get_session()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Current session, if signed in.
    pub session: Option<Session>,
}

/// Payload of `get_user()` and `update_user()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Current user, if signed in.
    pub user: Option<User>,
}

/// Token part of a sign-in result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Bearer token for backend calls.
    pub access_token: String,
}

/// Payload of `sign_in_with_password()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInData {
    /// The signed-in user, including the role.
    pub user: User,
    /// The new session.
    pub session: SessionToken,
}

/// Identifier and e-mail of a newly created user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User identifier.
    pub id: String,
    /// E-mail address.
    pub email: String,
}

/// Payload of `sign_up()` and admin provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpData {
    /// The created user.
    pub user: UserIdentity,
}

/// Result of `sign_out()`: error only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignOutResponse {
    /// Error; `None` on success.
    pub error: Option<ErrorInfo>,
}

/// Payload of a storage upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadData {
    /// Full object path, including the bucket prefix.
    pub path: String,
}

/// Payload of `get_public_url()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUrl {
    /// The public URL.
    #[serde(rename = "publicUrl")]
    pub public_url: String,
}

/// Result of `get_public_url()`: data only, it cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUrlResponse {
    /// The derived URL.
    pub data: PublicUrl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_envelope_always_has_both_fields() {
        let ok: Response<Data> = Response::empty();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"data": null, "error": null})
        );

        let err: Response<Data> = Response::err(QueryError::not_found("complaints"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"data": null, "error": {"message": "Row not found", "code": "PGRST116"}})
        );
    }

    #[test]
    fn test_data_serializes_untagged() {
        let record = json!({"id": "a"}).as_object().cloned().unwrap();
        let one = Response::ok(Data::One(record.clone()));
        let many = Response::ok(Data::Many(vec![record]));
        assert_eq!(serde_json::to_value(&one).unwrap()["data"], json!({"id": "a"}));
        assert_eq!(serde_json::to_value(&many).unwrap()["data"], json!([{"id": "a"}]));
    }

    #[test]
    fn test_public_url_field_name() {
        let response = PublicUrlResponse {
            data: PublicUrl {
                public_url: "https://x".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": {"publicUrl": "https://x"}})
        );
    }

    #[test]
    fn test_into_result() {
        let ok: Response<u8> = Response::ok(1);
        assert_eq!(ok.into_result(), Ok(Some(1)));

        let err: Response<u8> = Response::err(ErrorInfo::new("boom"));
        assert_eq!(err.into_result(), Err(ErrorInfo::new("boom")));
    }
}
