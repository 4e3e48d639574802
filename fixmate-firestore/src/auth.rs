//! E-mail/password auth over the Identity Toolkit REST API.

use async_trait::async_trait;
use fixmate_query::{AuthProvider, AuthUser, QueryError, QueryResult, UserProvisioner};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::error::FirestoreError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl AccountResponse {
    fn parse(value: Value) -> QueryResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| FirestoreError::decode(format!("account response: {}", e)).into())
    }

    fn into_user(self, fallback_email: &str) -> AuthUser {
        AuthUser {
            uid: self.local_id,
            email: self.email.unwrap_or_else(|| fallback_email.to_string()),
            display_name: self.display_name.filter(|name| !name.is_empty()),
            access_token: self.id_token.unwrap_or_default(),
        }
    }
}

/// Identity Toolkit accounts. The signed-in principal lives in the
/// client's session so the other seams can authorize with its token.
#[derive(Debug, Clone)]
pub struct IdentityAuth {
    client: FirestoreClient,
}

impl IdentityAuth {
    /// Create an auth seam on a client.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    async fn credential_call(&self, method: &str, email: &str, password: &str) -> QueryResult<AuthUser> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let response = self.client.identity(method, &body).await?;
        Ok(AccountResponse::parse(response)?.into_user(email))
    }

    fn current(&self) -> QueryResult<AuthUser> {
        self.client
            .session()
            .snapshot()
            .ok_or_else(QueryError::not_authenticated)
    }
}

#[async_trait]
impl AuthProvider for IdentityAuth {
    async fn current_user(&self) -> QueryResult<Option<AuthUser>> {
        self.client.session().settled().await
    }

    async fn sign_in(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        let user = self
            .credential_call("signInWithPassword", email, password)
            .await?;
        debug!(uid = %user.uid, "Signed in");
        self.client.session().sign_in(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        let user = self.credential_call("signUp", email, password).await?;
        debug!(uid = %user.uid, "Account created");
        self.client.session().sign_in(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> QueryResult<()> {
        self.client.session().sign_out();
        Ok(())
    }

    async fn update_password(&self, password: &str) -> QueryResult<()> {
        let current = self.current()?;
        let body = json!({
            "idToken": current.access_token,
            "password": password,
            "returnSecureToken": true,
        });
        let response = self.client.identity("update", &body).await?;

        // A password change revokes the old token.
        if let Some(token) = response.get("idToken").and_then(Value::as_str) {
            let token = token.to_string();
            self.client
                .session()
                .update_user(|user| user.access_token = token);
        }
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> QueryResult<()> {
        let current = self.current()?;
        let body = json!({
            "idToken": current.access_token,
            "displayName": display_name,
            "returnSecureToken": false,
        });
        self.client.identity("update", &body).await?;
        self.client
            .session()
            .update_user(|user| user.display_name = Some(display_name.to_string()));
        Ok(())
    }
}

#[async_trait]
impl UserProvisioner for IdentityAuth {
    async fn create_user(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        self.credential_call("signUp", email, password).await
    }
}
