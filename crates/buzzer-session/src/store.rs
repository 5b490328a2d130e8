//! The read side of the session layer, plus the provider operations pages
//! call directly.

use std::sync::Arc;

use buzzer_identity::{
    Credentials, ExternalSession, IdentityClient, IdentityError, UserDirectory,
};
use tokio::sync::{mpsc, watch};

use crate::{Reconciler, SessionConfig, SessionError, SessionState};

/// Handle to the reconciled session.
///
/// Cheap to clone; every clone sees the same state. Pass it explicitly to
/// whatever needs to know who is signed in (route guard, nav bar, pages).
///
/// The store never writes the state itself. Writes come only from the
/// paired [`Reconciler`], which must be running (see
/// [`Reconciler::observe_external_session`]) for the state to move past
/// [`SessionState::Initializing`].
pub struct SessionStore<I, D> {
    identity: Arc<I>,
    directory: Arc<D>,
    state: watch::Receiver<SessionState>,
    refresh: mpsc::UnboundedSender<()>,
}

impl<I, D> Clone for SessionStore<I, D> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            directory: Arc::clone(&self.directory),
            state: self.state.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

impl<I, D> SessionStore<I, D>
where
    I: IdentityClient,
    D: UserDirectory,
{
    /// Creates a store and its reconciler with the default config.
    ///
    /// ```rust,ignore
    /// let (store, reconciler) = SessionStore::new(provider, directory);
    /// tokio::spawn(reconciler.observe_external_session());
    /// ```
    pub fn new(identity: I, directory: D) -> (Self, Reconciler<I, D>) {
        Self::with_config(identity, directory, SessionConfig::default())
    }

    /// Creates a store and its reconciler.
    pub fn with_config(
        identity: I,
        directory: D,
        config: SessionConfig,
    ) -> (Self, Reconciler<I, D>) {
        Self::from_shared(Arc::new(identity), Arc::new(directory), config)
    }

    /// Like [`with_config`](Self::with_config), for collaborators the
    /// caller also keeps a handle to.
    pub fn from_shared(
        identity: Arc<I>,
        directory: Arc<D>,
        config: SessionConfig,
    ) -> (Self, Reconciler<I, D>) {
        let (tx, rx) = watch::channel(SessionState::Initializing);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let reconciler = Reconciler::new(
            Arc::clone(&identity),
            Arc::clone(&directory),
            tx,
            refresh_rx,
            config,
        );
        let store = Self {
            identity,
            directory,
            state: rx,
            refresh: refresh_tx,
        };
        (store, reconciler)
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver for the state channel, for callers that want to
    /// `select!` on changes themselves.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Waits for the next state change and returns the new state.
    ///
    /// # Errors
    /// [`SessionError::Closed`] once the reconciler has stopped.
    pub async fn changed(&mut self) -> Result<SessionState, SessionError> {
        self.state.changed().await.map_err(|_| SessionError::Closed)?;
        Ok(self.state.borrow_and_update().clone())
    }

    /// Waits until the state satisfies `predicate` (checking the current
    /// state first) and returns it.
    ///
    /// # Errors
    /// [`SessionError::Closed`] if the reconciler stops before that happens.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, SessionError> {
        let state = self
            .state
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(state.clone())
    }

    /// Asks the reconciler to look the current user up again.
    ///
    /// The sign-up flow calls this after creating the user record, since
    /// the lookup that ran when the session appeared found nothing.
    ///
    /// # Errors
    /// [`SessionError::Closed`] if the reconciler has stopped.
    pub fn refresh_user(&self) -> Result<(), SessionError> {
        self.refresh.send(()).map_err(|_| SessionError::Closed)
    }

    /// The user directory this store reconciles against.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    // -- Provider operations ---------------------------------------------
    //
    // Each one only forwards to the identity client. A successful call
    // changes the provider's session, which reaches the state through the
    // reconciler like any other event.

    /// Creates a provider account.
    pub async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<ExternalSession, IdentityError> {
        tracing::debug!(email = %credentials.email, "provider sign-up");
        self.identity.sign_up(credentials).await
    }

    /// Signs in with email and password.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> Result<ExternalSession, IdentityError> {
        tracing::debug!(email = %credentials.email, "provider sign-in");
        self.identity.sign_in(credentials).await
    }

    /// Signs in through the provider popup.
    pub async fn sign_in_with_provider(&self) -> Result<ExternalSession, IdentityError> {
        tracing::debug!("provider popup sign-in");
        self.identity.sign_in_with_provider().await
    }

    /// Signs out of the provider.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        tracing::debug!("provider sign-out");
        self.identity.sign_out().await
    }
}
