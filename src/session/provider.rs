//! Identity provider contract.
//!
//! The provider owns accounts and the live session. It reports sign-in and sign-out on a
//! broadcast channel so that the session gate can follow changes it did not start.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::broadcast;

/// The signed-in user as seen by views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Provider-assigned user id; budgets store it as their owner
    pub id: String,
    /// Login email
    pub email: String,
}

/// A live authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub access_token: String,
    /// Who the session belongs to
    pub user: UserIdentity,
}

/// Auth-state change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session started
    SignedIn(Session),
    /// The session ended
    SignedOut,
}

/// External identity/session provider.
///
/// Failures are reported as [`crate::errors::Error::Auth`].
pub trait IdentityProvider: Send + Sync + 'static {
    /// The session currently held by the provider, if any.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>>> + Send;

    /// Creates an account and returns its first session.
    fn sign_up(&self, email: &str, password: &str)
    -> impl Future<Output = Result<Session>> + Send;

    /// Starts a session for an existing account.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session>> + Send;

    /// Ends the current session.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Registers for auth-state change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
