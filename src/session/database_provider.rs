//! Identity provider backed by the `users` table.
//!
//! Passwords are stored as base64 PBKDF2-HMAC-SHA256 digests with a random 16-byte salt.
//! The provider keeps a single live session in memory, like a browser client would.
//! Sessions last one process: nothing about them is persisted, so a fresh provider over
//! the same store starts signed out and the user signs in again.

use crate::{
    config::AuthSettings,
    entities::{User, user},
    errors::{Error, Result},
    session::provider::{AuthEvent, IdentityProvider, Session, UserIdentity},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::{RngCore, rngs::OsRng};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use sha2::Sha256;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 16;
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Identity provider storing accounts in the application database.
#[derive(Debug)]
pub struct DatabaseIdentityProvider {
    db: Arc<DatabaseConnection>,
    settings: AuthSettings,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl DatabaseIdentityProvider {
    /// Creates a provider over `db`; the `users` table must already exist.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, settings: AuthSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            db,
            settings,
            current: RwLock::new(None),
            events,
        }
    }

    async fn start_session(&self, user: &user::Model) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user: UserIdentity {
                id: user.id.clone(),
                email: user.email.clone(),
            },
        };

        *self.current.write().await = Some(session.clone());
        // No listeners is fine; nobody has to hear about it.
        self.events.send(AuthEvent::SignedIn(session.clone())).ok();
        session
    }

    fn validate_new_account(&self, email: &str, password: &str) -> Result<()> {
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(Error::auth("Unable to validate email address: invalid format"));
        }

        if password.chars().count() < self.settings.min_password_length {
            return Err(Error::auth(format!(
                "Password should be at least {} characters",
                self.settings.min_password_length
            )));
        }
        Ok(())
    }
}

impl IdentityProvider for DatabaseIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>> {
        Ok(self.current.read().await.clone())
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        self.validate_new_account(&email, password)?;

        let existing = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(Error::auth("User already registered"));
        }

        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);

        let account = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email),
            password_hash: Set(derive_key(password, &salt, self.settings.pbkdf2_iterations)),
            salt: Set(B64.encode(salt)),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(user_id = %account.id, "Account created");
        Ok(self.start_session(&account).await)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        let Some(account) = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(self.db.as_ref())
            .await?
        else {
            debug!("No account for email");
            return Err(Error::auth(INVALID_CREDENTIALS));
        };

        let salt = B64.decode(account.salt.as_bytes()).map_err(|e| {
            warn!(user_id = %account.id, "Stored salt is not valid base64: {e}");
            Error::auth(INVALID_CREDENTIALS)
        })?;

        if derive_key(password, &salt, self.settings.pbkdf2_iterations) != account.password_hash {
            debug!(user_id = %account.id, "Password mismatch");
            return Err(Error::auth(INVALID_CREDENTIALS));
        }

        Ok(self.start_session(&account).await)
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self.current.write().await.take();
        if previous.is_some() {
            self.events.send(AuthEvent::SignedOut).ok();
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    B64.encode(key)
}
