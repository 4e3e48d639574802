//! Auth facade.
//!
//! Wraps an [`AuthProvider`](crate::traits::AuthProvider) and the profile
//! collection, normalizing every result into the `{ data, error }`
//! envelope. Roles live in the profile record (`users/{uid}` by default),
//! not in the auth backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Client;
use crate::document::{CREATED_AT_FIELD, Record, timestamp_now};
use crate::error::{QueryError, QueryResult};
use crate::response::{
    Response, Session, SessionData, SessionToken, SignInData, SignOutResponse, SignUpData, User,
    UserData, UserIdentity, UserMetadata,
};
use crate::traits::{AuthUser, Write};

/// Profile field holding the role.
pub const ROLE_FIELD: &str = "role";
/// Profile field holding the display name.
pub const FULL_NAME_FIELD: &str = "full_name";
/// Profile field holding the e-mail address.
pub const EMAIL_FIELD: &str = "email";

/// E-mail and password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// E-mail address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Extra sign-up options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpOptions {
    /// Fields written into the profile record.
    #[serde(default)]
    pub data: Record,
}

/// Sign-up request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    /// E-mail address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Options.
    #[serde(default)]
    pub options: SignUpOptions,
}

impl SignUpRequest {
    /// Create a request without profile data.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            options: SignUpOptions::default(),
        }
    }

    /// Set the profile data.
    pub fn with_data(mut self, data: Record) -> Self {
        self.options.data = data;
        self
    }
}

/// Changes for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Fields merged into the profile record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
}

/// Auth facade, obtained from [`Client::auth`].
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a Client,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The current session, once the auth state has settled.
    pub async fn get_session(&self) -> Response<SessionData> {
        self.settled_user()
            .await
            .map(|user| {
                Some(SessionData {
                    session: user.map(|user| Session {
                        access_token: user.access_token.clone(),
                        user: normalize_user(&user, None),
                    }),
                })
            })
            .into()
    }

    /// The current user, once the auth state has settled.
    pub async fn get_user(&self) -> Response<UserData> {
        self.settled_user()
            .await
            .map(|user| {
                Some(UserData {
                    user: user.map(|user| normalize_user(&user, None)),
                })
            })
            .into()
    }

    /// Sign in and attach the stored role.
    pub async fn sign_in_with_password(&self, credentials: Credentials) -> Response<SignInData> {
        let provider = self.client.auth_provider();
        let result = self
            .client
            .call(
                "sign_in",
                provider.sign_in(&credentials.email, &credentials.password),
            )
            .await;

        match result {
            Ok(user) => {
                let role = self.stored_role(&user.uid).await;
                debug!(uid = %user.uid, role = %role, "Signed in");
                Response::ok(SignInData {
                    session: SessionToken {
                        access_token: user.access_token.clone(),
                    },
                    user: normalize_user(&user, Some(role)),
                })
            }
            Err(err) => Response::err(err),
        }
    }

    /// Sign out.
    pub async fn sign_out(&self) -> SignOutResponse {
        let provider = self.client.auth_provider();
        match self.client.call("sign_out", provider.sign_out()).await {
            Ok(()) => SignOutResponse { error: None },
            Err(err) => SignOutResponse {
                error: Some(err.into()),
            },
        }
    }

    /// Create a credential and its profile record.
    pub async fn sign_up(&self, request: SignUpRequest) -> Response<SignUpData> {
        self.try_sign_up(request).await.map(Some).into()
    }

    /// Rotate the password and merge profile data for the signed-in user.
    pub async fn update_user(&self, update: UserUpdate) -> Response<UserData> {
        self.try_update_user(update).await.map(Some).into()
    }

    async fn settled_user(&self) -> QueryResult<Option<AuthUser>> {
        let provider = self.client.auth_provider();
        self.client.call("current_user", provider.current_user()).await
    }

    async fn stored_role(&self, uid: &str) -> String {
        let config = &self.client.config().auth;
        let store = self.client.store();
        let profile = self
            .client
            .call("get", store.get(&config.profile_collection, uid))
            .await;

        match profile {
            Ok(Some(doc)) => match doc.get(ROLE_FIELD) {
                Some(Value::String(role)) if !role.is_empty() => role.clone(),
                _ => config.default_role.clone(),
            },
            Ok(None) => config.default_role.clone(),
            Err(err) => {
                warn!(uid, error = %err, "Failed to read profile role, using default");
                config.default_role.clone()
            }
        }
    }

    async fn try_sign_up(&self, request: SignUpRequest) -> QueryResult<SignUpData> {
        let provider = self.client.auth_provider();
        let user = self
            .client
            .call("sign_up", provider.sign_up(&request.email, &request.password))
            .await?;

        write_profile(self.client, &user.uid, &request.email, &request.options.data).await?;

        if let Some(Value::String(name)) = request.options.data.get(FULL_NAME_FIELD) {
            self.client
                .call("update_display_name", provider.update_display_name(name))
                .await?;
        }

        debug!(uid = %user.uid, "Signed up");
        Ok(SignUpData {
            user: UserIdentity {
                id: user.uid,
                email: request.email,
            },
        })
    }

    async fn try_update_user(&self, update: UserUpdate) -> QueryResult<UserData> {
        let provider = self.client.auth_provider();
        let Some(mut user) = self.settled_user().await? else {
            return Err(QueryError::not_authenticated());
        };

        if let Some(password) = update.password.as_deref() {
            self.client
                .call("update_password", provider.update_password(password))
                .await?;
        }

        if let Some(data) = update.data.filter(|data| !data.is_empty()) {
            let store = self.client.store();
            let write = Write::Merge {
                collection: self.client.config().auth.profile_collection.clone(),
                id: user.uid.clone(),
                fields: data.clone(),
            };
            self.client.call("commit", store.commit(vec![write])).await?;

            if let Some(Value::String(name)) = data.get(FULL_NAME_FIELD) {
                self.client
                    .call("update_display_name", provider.update_display_name(name))
                    .await?;
                user.display_name = Some(name.clone());
            }
        }

        Ok(UserData {
            user: Some(normalize_user(&user, None)),
        })
    }
}

/// Write a new profile record: `{ email, role: default, ...data, created_at }`.
///
/// Caller data wins over the defaults, including `role`.
pub(crate) async fn write_profile(
    client: &Client,
    uid: &str,
    email: &str,
    data: &Record,
) -> QueryResult<()> {
    let config = &client.config().auth;

    let mut fields = Record::new();
    fields.insert(EMAIL_FIELD.to_string(), Value::String(email.to_string()));
    fields.insert(ROLE_FIELD.to_string(), Value::String(config.default_role.clone()));
    for (key, value) in data {
        fields.insert(key.clone(), value.clone());
    }
    fields.insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp_now()));

    let write = Write::Set {
        collection: config.profile_collection.clone(),
        id: uid.to_string(),
        fields,
    };
    let store = client.store();
    client.call("commit", store.commit(vec![write])).await
}

fn normalize_user(user: &AuthUser, role: Option<String>) -> User {
    User {
        id: user.uid.clone(),
        email: user.email.clone(),
        role,
        user_metadata: UserMetadata {
            full_name: Some(user.full_name()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_up_request_deserialize() {
        let request: SignUpRequest = serde_json::from_value(json!({
            "email": "a@campus.edu",
            "password": "secret",
            "options": {"data": {"full_name": "Ann"}}
        }))
        .unwrap();
        assert_eq!(request.options.data.get("full_name"), Some(&json!("Ann")));

        let bare: SignUpRequest = serde_json::from_value(json!({
            "email": "a@campus.edu",
            "password": "secret"
        }))
        .unwrap();
        assert!(bare.options.data.is_empty());
    }

    #[test]
    fn test_normalize_user_falls_back_to_local_part() {
        let user = AuthUser {
            uid: "u1".to_string(),
            email: "sam@campus.edu".to_string(),
            display_name: None,
            access_token: "t".to_string(),
        };
        let normalized = normalize_user(&user, Some("staff".to_string()));
        assert_eq!(normalized.user_metadata.full_name.as_deref(), Some("sam"));
        assert_eq!(normalized.role.as_deref(), Some("staff"));
    }
}
