//! The reconciler: the single writer of [`SessionState`].
//!
//! It turns the provider's session events into backend lookups and folds
//! the answers back into the published state.
//!
//! # Ordering
//!
//! Session events are applied in the order the provider emits them. Every
//! event that needs a lookup bumps a generation counter and hands out a
//! [`LookupTicket`] stamped with it. When a lookup completes, its ticket is
//! compared with the current generation; an older ticket means a newer
//! session has already taken over, and the result is dropped. So if S1's
//! lookup finishes after S2's started, S1 never overwrites anything, no
//! matter which finishes first.
//!
//! Nothing is cancelled: superseded lookups run to completion and their
//! results are ignored.

use std::sync::Arc;

use buzzer_identity::{
    ExternalId, ExternalSession, IdentityClient, InternalUser, LookupError,
    UserDirectory,
};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::{SessionConfig, SessionError, SessionState};

/// Proof that a lookup was started for a particular session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    external_id: ExternalId,
}

impl LookupTicket {
    /// The account the lookup is for.
    pub fn external_id(&self) -> &ExternalId {
        &self.external_id
    }

    /// The transition this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`Reconciler::apply_lookup`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The result belonged to the current session and was published.
    Applied,
    /// A newer session took over first; the result was dropped.
    Superseded,
}

/// Drives reconciliation. Created by [`SessionStore::new`](crate::SessionStore::new).
///
/// There is exactly one `Reconciler` per store, and it owns the write side
/// of the state channel, so nothing else can publish a state.
pub struct Reconciler<I, D> {
    identity: Arc<I>,
    directory: Arc<D>,
    state: watch::Sender<SessionState>,
    /// Re-lookup requests from [`SessionStore::refresh_user`](crate::SessionStore::refresh_user).
    refresh: mpsc::UnboundedReceiver<()>,
    config: SessionConfig,
    /// Bumped on every transition that starts or invalidates a lookup.
    generation: u64,
}

impl<I, D> Reconciler<I, D>
where
    I: IdentityClient,
    D: UserDirectory,
{
    pub(crate) fn new(
        identity: Arc<I>,
        directory: Arc<D>,
        state: watch::Sender<SessionState>,
        refresh: mpsc::UnboundedReceiver<()>,
        config: SessionConfig,
    ) -> Self {
        Self {
            identity,
            directory,
            state,
            refresh,
            config,
            generation: 0,
        }
    }

    /// A copy of the state as last published.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Applies one provider event.
    ///
    /// Returns a ticket when the caller must run a lookup (see
    /// [`run_lookup`]) and feed the result to [`apply_lookup`](Self::apply_lookup).
    pub fn apply_session(
        &mut self,
        session: Option<ExternalSession>,
    ) -> Option<LookupTicket> {
        let Some(session) = session else {
            // Invalidate whatever lookup may still be in flight.
            self.generation += 1;
            let previous = self.state.send_replace(SessionState::SignedOut);
            tracing::info!(from = previous.label(), "session cleared");
            return None;
        };

        if self.is_refresh_of_current(&session) {
            let external_id = session.external_id.clone();
            let credential = session.has_credential();
            self.state.send_modify(|state| match state {
                SessionState::CheckingUser { session: current }
                | SessionState::SignedIn {
                    session: current, ..
                } => *current = session,
                _ => {}
            });
            tracing::debug!(%external_id, credential, "session refreshed, keeping lookup");
            return None;
        }

        self.generation += 1;
        let ticket = LookupTicket {
            generation: self.generation,
            external_id: session.external_id.clone(),
        };
        let credential = session.has_credential();
        let previous = self
            .state
            .send_replace(SessionState::CheckingUser { session });
        tracing::info!(
            from = previous.label(),
            external_id = %ticket.external_id,
            generation = ticket.generation,
            credential,
            "session changed, looking up user"
        );
        Some(ticket)
    }

    /// Re-runs the lookup for the current session, e.g. after the sign-up
    /// flow created the user record the previous lookup didn't find.
    ///
    /// Returns `None` when nobody is signed in.
    pub fn apply_refresh(&mut self) -> Option<LookupTicket> {
        let session = self.state.borrow().external_session().cloned()?;

        self.generation += 1;
        let ticket = LookupTicket {
            generation: self.generation,
            external_id: session.external_id.clone(),
        };
        self.state.send_replace(SessionState::CheckingUser { session });
        tracing::info!(
            external_id = %ticket.external_id,
            generation = ticket.generation,
            "refreshing user"
        );
        Some(ticket)
    }

    /// Folds a lookup result into the state.
    ///
    /// # Errors
    /// Returns [`SessionError::Lookup`] when the lookup for the *current*
    /// session failed. The state is `LookupFailed` by then; the error is
    /// handed back so the caller can report it. Failures of superseded
    /// lookups are dropped like any other stale result.
    pub fn apply_lookup(
        &mut self,
        ticket: LookupTicket,
        result: Result<Option<InternalUser>, LookupError>,
    ) -> Result<LookupOutcome, SessionError> {
        if ticket.generation != self.generation {
            tracing::debug!(
                external_id = %ticket.external_id,
                generation = ticket.generation,
                current = self.generation,
                "dropping superseded lookup result"
            );
            return Ok(LookupOutcome::Superseded);
        }

        let Some(session) = self.state.borrow().external_session().cloned() else {
            return Ok(LookupOutcome::Superseded);
        };

        match result {
            Ok(user) => {
                match &user {
                    Some(user) => tracing::info!(
                        external_id = %ticket.external_id,
                        user_id = %user.id,
                        "user resolved"
                    ),
                    None => tracing::info!(
                        external_id = %ticket.external_id,
                        "no user record, sign-up required"
                    ),
                }
                self.state.send_replace(SessionState::SignedIn { session, user });
                Ok(LookupOutcome::Applied)
            }
            Err(err) => {
                self.state.send_replace(SessionState::LookupFailed {
                    session,
                    reason: err.to_string(),
                });
                Err(SessionError::Lookup(err))
            }
        }
    }

    /// Subscribes to the provider and reconciles until the subscription
    /// ends. Also serves [`SessionStore::refresh_user`](crate::SessionStore::refresh_user)
    /// requests.
    ///
    /// Consumes the reconciler, so a store subscribes exactly once. Lookups
    /// run concurrently with event handling on the same task. When the
    /// provider closes the stream, lookups still in flight are allowed to
    /// finish (and are applied or dropped as usual) before this returns.
    pub async fn observe_external_session(mut self) {
        let mut events = self.identity.subscribe();
        let mut lookups = FuturesUnordered::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(session) => {
                        if let Some(ticket) = self.apply_session(session) {
                            lookups.push(run_lookup(Arc::clone(&self.directory), ticket));
                        }
                    }
                    None => {
                        tracing::debug!("identity subscription closed");
                        break;
                    }
                },
                Some(()) = self.refresh.recv() => {
                    if let Some(ticket) = self.apply_refresh() {
                        lookups.push(run_lookup(Arc::clone(&self.directory), ticket));
                    }
                }
                Some((ticket, result)) = lookups.next(), if !lookups.is_empty() => {
                    self.report(ticket, result);
                }
            }
        }

        while let Some((ticket, result)) = lookups.next().await {
            self.report(ticket, result);
        }
    }

    fn report(
        &mut self,
        ticket: LookupTicket,
        result: Result<Option<InternalUser>, LookupError>,
    ) {
        let external_id = ticket.external_id.clone();
        if let Err(e) = self.apply_lookup(ticket, result) {
            tracing::warn!(%external_id, error = %e, "user lookup failed");
        }
    }

    /// `true` when `session` is the account we already have (or are
    /// already looking up) and the config says not to look it up again.
    fn is_refresh_of_current(&self, session: &ExternalSession) -> bool {
        if self.config.refresh_on_same_identity {
            return false;
        }
        match &*self.state.borrow() {
            SessionState::CheckingUser { session: current }
            | SessionState::SignedIn {
                session: current, ..
            } => current.external_id == session.external_id,
            _ => false,
        }
    }
}

/// Runs the directory lookup a ticket asks for.
///
/// Owns everything it touches, so the future can sit in a
/// `FuturesUnordered` while the reconciler keeps handling events.
pub async fn run_lookup<D: UserDirectory>(
    directory: Arc<D>,
    ticket: LookupTicket,
) -> (LookupTicket, Result<Option<InternalUser>, LookupError>) {
    let result = directory.find_by_external_id(&ticket.external_id).await;
    (ticket, result)
}
