//! Shared auth state for backends.
//!
//! Backends publish auth transitions through a [`SessionState`]; readers
//! wait on the channel until the state has left
//! [`AuthState::Initializing`] instead of polling.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::traits::AuthUser;

/// Auth state of a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// A persisted session is still being restored.
    Initializing,
    /// Nobody is signed in.
    SignedOut,
    /// A principal is signed in.
    SignedIn(AuthUser),
}

impl AuthState {
    /// Check if the state is final.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Initializing)
    }

    /// The signed-in principal.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Watch channel over [`AuthState`]. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<AuthState>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_state(AuthState::SignedOut)
    }
}

impl SessionState {
    /// A state that is still restoring; readers wait for the first
    /// transition.
    pub fn initializing() -> Self {
        Self::with_state(AuthState::Initializing)
    }

    /// A settled state with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    fn with_state(state: AuthState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a new state.
    pub fn set(&self, state: AuthState) {
        debug!(settled = state.is_settled(), signed_in = state.user().is_some(), "Auth state changed");
        self.tx.send_replace(state);
    }

    /// Publish a signed-in principal.
    pub fn sign_in(&self, user: AuthUser) {
        self.set(AuthState::SignedIn(user));
    }

    /// Publish a sign-out.
    pub fn sign_out(&self) {
        self.set(AuthState::SignedOut);
    }

    /// Modify the signed-in principal in place. Returns `false` when
    /// nobody is signed in.
    pub fn update_user(&self, f: impl FnOnce(&mut AuthUser)) -> bool {
        self.tx.send_if_modified(|state| match state {
            AuthState::SignedIn(user) => {
                f(user);
                true
            }
            _ => false,
        })
    }

    /// The current principal without waiting.
    pub fn snapshot(&self) -> Option<AuthUser> {
        self.tx.borrow().user().cloned()
    }

    /// Wait until the state has settled and return the principal.
    pub async fn settled(&self) -> QueryResult<Option<AuthUser>> {
        let mut rx = self.tx.subscribe();
        let state = rx
            .wait_for(AuthState::is_settled)
            .await
            .map_err(|_| QueryError::internal("auth state channel closed"))?;
        Ok(state.user().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn user() -> AuthUser {
        AuthUser {
            uid: "u1".to_string(),
            email: "a@b.c".to_string(),
            display_name: None,
            access_token: "t".to_string(),
        }
    }

    #[tokio::test]
    async fn test_settled_returns_immediately_when_signed_out() {
        let state = SessionState::signed_out();
        assert_eq!(state.settled().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_settled_waits_for_transition() {
        let state = SessionState::initializing();
        let publisher = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.sign_in(user());
        });
        let current = state.settled().await.unwrap();
        assert_eq!(current.map(|u| u.uid), Some("u1".to_string()));
    }

    #[test]
    fn test_update_user_requires_sign_in() {
        let state = SessionState::signed_out();
        assert!(!state.update_user(|u| u.display_name = Some("x".into())));

        state.sign_in(user());
        assert!(state.update_user(|u| u.display_name = Some("Jane".into())));
        assert_eq!(
            state.snapshot().and_then(|u| u.display_name),
            Some("Jane".to_string())
        );
    }
}
