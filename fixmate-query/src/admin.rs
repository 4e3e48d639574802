//! Privileged user provisioning.
//!
//! Staff accounts are created by an administrator who is signed in
//! themselves. Provisioning goes through a
//! [`UserProvisioner`](crate::traits::UserProvisioner) so the acting
//! session is never replaced by the new account.

use tracing::info;

use crate::auth::write_profile;
use crate::client::Client;
use crate::document::Record;
use crate::error::{QueryError, QueryResult};
use crate::response::{Response, SignUpData, UserIdentity};

/// Admin facade, obtained from [`Client::admin`].
#[derive(Debug, Clone, Copy)]
pub struct Admin<'a> {
    client: &'a Client,
}

impl<'a> Admin<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Check if the backend can provision users.
    pub fn is_supported(&self) -> bool {
        self.client.provisioner().is_some()
    }

    /// Create a credential and its profile record without touching the
    /// current session.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        profile: Record,
    ) -> Response<SignUpData> {
        self.try_create_user(email, password, profile)
            .await
            .map(Some)
            .into()
    }

    async fn try_create_user(
        &self,
        email: &str,
        password: &str,
        profile: Record,
    ) -> QueryResult<SignUpData> {
        let provisioner = self
            .client
            .provisioner()
            .ok_or_else(|| QueryError::unsupported("user provisioning"))?;

        let user = self
            .client
            .call("create_user", provisioner.create_user(email, password))
            .await?;
        write_profile(self.client, &user.uid, email, &profile).await?;

        info!(uid = %user.uid, "Provisioned user");
        Ok(SignUpData {
            user: UserIdentity {
                id: user.uid,
                email: email.to_string(),
            },
        })
    }
}
