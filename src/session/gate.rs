//! Session gate - the single writer of session state.
//!
//! The gate fetches the provider's session once at startup, then follows the provider's
//! auth events for the rest of the process. Sign-in, sign-out and incoming events all
//! publish through one serialized path that reads the provider's current session, so an
//! event queued before a newer sign-in cannot bring back the older session.
//!
//! Views never talk to the provider; they get a [`SessionHandle`], a cheap read-only
//! view of the gate's state.

use crate::{
    errors::{Error, Result},
    routes::{Access, Route, resolve_access},
    session::provider::{AuthEvent, IdentityProvider, Session, UserIdentity},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, error, info, instrument, warn};

/// Session state shared by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Live session, if signed in
    pub session: Option<Session>,
    /// True until the initial session fetch finishes
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

/// Read-only view of the session state handed to views.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// A handle pinned to `state` with no gate behind it.
    #[must_use]
    pub fn fixed(state: SessionState) -> Self {
        let (_, state) = watch::channel(state);
        Self { state }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// True while the initial session fetch is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// The signed-in user, or [`Error::AuthRequired`].
    pub fn require_user(&self) -> Result<UserIdentity> {
        self.current_user().ok_or(Error::AuthRequired)
    }

    /// What a view for `route` should do right now.
    #[must_use]
    pub fn access(&self, route: &Route) -> Access {
        resolve_access(&self.state.borrow(), route)
    }

    /// Waits until the session state changes. Returns false once the gate is gone.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

/// Owner of the process-wide session state.
#[derive(Debug)]
pub struct SessionGate<P> {
    shared: Arc<Publisher<P>>,
    initialized: AtomicBool,
}

/// The write side of the session state, shared with the event listener.
///
/// Every write re-reads the provider's current session under `writer`, so writes are
/// applied one at a time and never publish a session the provider has already replaced.
#[derive(Debug)]
struct Publisher<P> {
    provider: Arc<P>,
    state: watch::Sender<SessionState>,
    writer: Mutex<()>,
}

impl<P: IdentityProvider> Publisher<P> {
    /// Publishes whatever session the provider holds right now.
    async fn sync(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        let session = self.provider.get_session().await?;
        self.state
            .send_if_modified(|state| replace_session(state, session));
        Ok(())
    }

    /// Publishes "signed out" without asking the provider.
    async fn clear(&self) {
        let _writer = self.writer.lock().await;
        self.state
            .send_if_modified(|state| replace_session(state, None));
    }
}

impl<P: IdentityProvider> SessionGate<P> {
    /// Creates a gate in the loading state. Call [`SessionGate::initialize`] next.
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            shared: Arc::new(Publisher {
                provider,
                state,
                writer: Mutex::new(()),
            }),
            initialized: AtomicBool::new(false),
        }
    }

    /// A new read-only handle on the session state.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            state: self.shared.state.subscribe(),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.shared
            .state
            .borrow()
            .session
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// True while the initial session fetch is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// Restores the provider's session and starts following auth events.
    ///
    /// Runs once; later calls do nothing. A provider failure is logged and leaves the
    /// user signed out, with loading finished.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session gate already initialized");
            return;
        }

        // Subscribe before fetching so no event between the two is lost
        let events = self.shared.provider.subscribe();

        match self.shared.sync().await {
            Ok(()) => debug!(restored = self.current_user().is_some(), "Initial session fetched"),
            Err(e) => {
                error!("Error initializing auth: {e}");
                self.shared.clear().await;
            }
        }

        tokio::spawn(follow_auth_events(events, Arc::clone(&self.shared)));
    }

    /// Signs in and publishes the session to every handle.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let session = self
            .shared
            .provider
            .sign_in_with_password(email, password)
            .await
            .inspect_err(|e| warn!("Sign-in failed: {e}"))?;
        self.shared.sync().await?;

        info!(user_id = %session.user.id, "Signed in");
        Ok(session.user)
    }

    /// Creates an account, then signs in with the same credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<UserIdentity> {
        self.shared
            .provider
            .sign_up(email, password)
            .await
            .inspect_err(|e| warn!("Sign-up failed: {e}"))?;
        self.sign_in(email, password).await
    }

    /// Clears the local session. Provider errors are logged, not returned.
    pub async fn sign_out(&self) {
        let synced = match self.shared.provider.sign_out().await {
            Ok(()) => self.shared.sync().await,
            Err(e) => Err(e),
        };
        if let Err(e) = synced {
            warn!("Provider sign-out failed: {e}");
            self.shared.clear().await;
        }
        info!("Signed out");
    }
}

async fn follow_auth_events<P: IdentityProvider>(
    mut events: broadcast::Receiver<AuthEvent>,
    shared: Arc<Publisher<P>>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(?event, "Auth state changed");
                if let Err(e) = shared.sync().await {
                    warn!("Could not refresh session after auth event: {e}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed auth events");
                if let Err(e) = shared.sync().await {
                    warn!("Could not refresh session after missed events: {e}");
                }
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Identity provider closed its event channel");
                break;
            }
        }
    }
}

fn replace_session(state: &mut SessionState, session: Option<Session>) -> bool {
    let changed = state.session != session || state.loading;
    state.session = session;
    state.loading = false;
    changed
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::session::DatabaseIdentityProvider;
    use crate::test_utils::*;

    async fn setup_gate() -> Result<(Arc<DatabaseIdentityProvider>, SessionGate<DatabaseIdentityProvider>)> {
        let provider = Arc::new(setup_test_provider().await?);
        let gate = SessionGate::new(Arc::clone(&provider));
        Ok((provider, gate))
    }

    #[tokio::test]
    async fn test_gate_starts_loading_until_initialized() -> Result<()> {
        let (_provider, gate) = setup_gate().await?;
        assert!(gate.is_loading());
        assert!(gate.current_user().is_none());

        gate.initialize().await;
        assert!(!gate.is_loading());
        assert!(gate.current_user().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_restores_existing_session() -> Result<()> {
        let (provider, gate) = setup_gate().await?;
        let session = provider.sign_up("ana@obra.com", "segredo123").await?;

        gate.initialize().await;
        assert_eq!(gate.current_user(), Some(session.user));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_up_signs_in_and_reaches_handles() -> Result<()> {
        let (_provider, gate) = setup_gate().await?;
        gate.initialize().await;
        let handle = gate.handle();

        let user = gate.sign_up("ana@obra.com", "segredo123").await?;
        assert_eq!(user.email, "ana@obra.com");
        assert_eq!(handle.current_user(), Some(user.clone()));
        assert_eq!(handle.require_user()?, user);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_user_signed_out() -> Result<()> {
        let (_provider, gate) = setup_gate().await?;
        gate.initialize().await;

        let result = gate.sign_in("ana@obra.com", "segredo123").await;
        assert!(matches!(result, Err(Error::Auth { .. })));
        assert!(gate.current_user().is_none());
        assert!(matches!(
            gate.handle().require_user(),
            Err(Error::AuthRequired)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() -> Result<()> {
        let (provider, gate) = setup_gate().await?;
        gate.initialize().await;
        gate.sign_up("ana@obra.com", "segredo123").await?;

        gate.sign_out().await;
        assert!(gate.current_user().is_none());
        assert!(provider.get_session().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_gate_follows_provider_events() -> Result<()> {
        let (provider, gate) = setup_gate().await?;
        gate.initialize().await;
        let mut handle = gate.handle();

        // Sign-in that bypasses the gate, e.g. from another window
        let session = provider.sign_up("ana@obra.com", "segredo123").await?;
        assert!(handle.changed().await);
        assert_eq!(handle.current_user(), Some(session.user));

        provider.sign_out().await?;
        assert!(handle.changed().await);
        assert!(handle.current_user().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_runs_once() -> Result<()> {
        let (provider, gate) = setup_gate().await?;
        gate.initialize().await;

        // A session the gate has not heard about yet must not be picked up by re-fetching
        provider.sign_up("ana@obra.com", "segredo123").await?;
        gate.initialize().await;
        assert!(!gate.is_loading());

        let mut handle = gate.handle();
        if gate.current_user().is_none() {
            // Only the event listener may deliver it
            assert!(handle.changed().await);
        }
        assert_eq!(gate.current_user().unwrap().email, "ana@obra.com");
        Ok(())
    }

    /// A closed channel holding `events`, as a lagging listener would see them.
    fn queued(events: &[AuthEvent]) -> broadcast::Receiver<AuthEvent> {
        let (sender, receiver) = broadcast::channel(events.len().max(1));
        for event in events {
            sender.send(event.clone()).unwrap();
        }
        receiver
    }

    #[tokio::test]
    async fn test_queued_sign_in_does_not_restore_replaced_session() -> Result<()> {
        let (provider, gate) = setup_gate().await?;
        gate.initialize().await;

        // Sign-up starts one session and the gate's sign-in replaces it
        let replaced = provider.sign_up("ana@obra.com", "segredo123").await?;
        gate.sign_in("ana@obra.com", "segredo123").await?;
        let latest = provider.get_session().await?.unwrap();
        assert_ne!(replaced.access_token, latest.access_token);

        let stale = queued(&[AuthEvent::SignedIn(replaced.clone())]);
        follow_auth_events(stale, Arc::clone(&gate.shared)).await;
        assert_eq!(gate.handle().state.borrow().session, Some(latest));

        gate.sign_out().await;
        let stale = queued(&[AuthEvent::SignedIn(replaced)]);
        follow_auth_events(stale, Arc::clone(&gate.shared)).await;
        assert!(gate.current_user().is_none());
        assert!(!gate.is_loading());
        Ok(())
    }

    #[test]
    fn test_fixed_handle() {
        let handle = SessionHandle::fixed(signed_in_state());
        assert!(!handle.is_loading());
        assert_eq!(handle.current_user().unwrap().id, TEST_OWNER);

        let loading = SessionHandle::fixed(SessionState::default());
        assert!(loading.is_loading());
        assert!(loading.current_user().is_none());
    }
}
