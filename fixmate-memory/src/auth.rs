//! In-memory credential store with a single current session.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fixmate_query::{
    AuthProvider, AuthUser, QueryError, QueryResult, SessionState, UserProvisioner,
};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{MemoryError, MemoryResult};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: Option<String>,
}

impl Account {
    fn to_user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            access_token: format!("mem.{}", Uuid::new_v4().simple()),
        }
    }
}

/// Accounts keyed by lower-cased e-mail, plus the current session.
/// Clones share the same accounts and session.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuth {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    session: SessionState,
}

impl MemoryAuth {
    /// Create an auth service with no accounts and nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an auth service whose session is still being restored;
    /// readers wait until [`MemoryAuth::session`] publishes a state.
    pub fn restoring() -> Self {
        Self {
            accounts: Arc::default(),
            session: SessionState::initializing(),
        }
    }

    /// The session channel.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Add an account without signing in. Returns the new uid.
    pub fn add_user(&self, email: &str, password: &str) -> QueryResult<String> {
        Ok(self.create_account(email, password)?.uid)
    }

    /// Number of accounts.
    pub fn user_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Display name stored for an account.
    pub fn display_name(&self, email: &str) -> Option<String> {
        self.accounts
            .read()
            .get(&email.to_lowercase())
            .and_then(|account| account.display_name.clone())
    }

    fn create_account(&self, email: &str, password: &str) -> MemoryResult<Account> {
        if !is_valid_email(email) {
            return Err(MemoryError::InvalidEmail(email.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MemoryError::WeakPassword);
        }

        let key = email.to_lowercase();
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&key) {
            return Err(MemoryError::EmailInUse(email.to_string()));
        }

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        };
        accounts.insert(key, account.clone());
        debug!(uid = %account.uid, "Account created");
        Ok(account)
    }

    fn with_current_account<T>(&self, f: impl FnOnce(&mut Account) -> T) -> QueryResult<T> {
        let current = self
            .session
            .snapshot()
            .ok_or_else(QueryError::not_authenticated)?;
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(&current.email.to_lowercase())
            .ok_or_else(|| MemoryError::UserNotFound(current.email.clone()))?;
        Ok(f(account))
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_user(&self) -> QueryResult<Option<AuthUser>> {
        self.session.settled().await
    }

    async fn sign_in(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        let account = self
            .accounts
            .read()
            .get(&email.to_lowercase())
            .cloned()
            .ok_or_else(|| MemoryError::UserNotFound(email.to_string()))?;
        if account.password != password {
            return Err(MemoryError::WrongPassword.into());
        }

        let user = account.to_user();
        self.session.sign_in(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        let user = self.create_account(email, password)?.to_user();
        self.session.sign_in(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> QueryResult<()> {
        self.session.sign_out();
        Ok(())
    }

    async fn update_password(&self, password: &str) -> QueryResult<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MemoryError::WeakPassword.into());
        }
        self.with_current_account(|account| account.password = password.to_string())
    }

    async fn update_display_name(&self, display_name: &str) -> QueryResult<()> {
        self.with_current_account(|account| account.display_name = Some(display_name.to_string()))?;
        self.session
            .update_user(|user| user.display_name = Some(display_name.to_string()));
        Ok(())
    }
}

#[async_trait]
impl UserProvisioner for MemoryAuth {
    async fn create_user(&self, email: &str, password: &str) -> QueryResult<AuthUser> {
        Ok(self.create_account(email, password)?.to_user())
    }
}
