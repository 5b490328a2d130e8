//! `BuzzerClient` builder and event loop.
//!
//! This is the entry point for wiring Buzzer into an app. It ties the layers
//! together: identity provider → reconciler → session state → route guard →
//! router.

use std::sync::Arc;

use buzzer_identity::{IdentityClient, UserDirectory};
use buzzer_route::{GuardOutcome, LoadingKind, RouteConfig, RouteGuard, Router};
use buzzer_session::{Reconciler, SessionConfig, SessionStore};
use tokio::sync::watch;

use crate::flow::AuthFlows;
use crate::{BuzzerError, ClientConfig};

/// Builder for configuring a [`BuzzerClient`].
///
/// # Example
///
/// ```rust,ignore
/// use buzzer::prelude::*;
///
/// let client = BuzzerClient::builder()
///     .config(ClientConfig::from_json_str(&settings)?)
///     .build(provider, directory, router);
/// client.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuzzerClientBuilder {
    config: ClientConfig,
}

impl BuzzerClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the route configuration.
    pub fn route_config(mut self, config: RouteConfig) -> Self {
        self.config.route = config;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Builds the client around the app's collaborators.
    ///
    /// Nothing runs until [`BuzzerClient::run`] is awaited.
    pub fn build<I, D, R>(self, identity: I, directory: D, router: R) -> BuzzerClient<I, D, R>
    where
        I: IdentityClient,
        D: UserDirectory,
        R: Router,
    {
        let (store, reconciler) = SessionStore::from_shared(
            Arc::new(identity),
            Arc::new(directory),
            self.config.session,
        );
        let (outcome, _) = watch::channel(GuardOutcome::Loading(LoadingKind::Session));

        BuzzerClient {
            store,
            reconciler,
            guard: RouteGuard::new(self.config.route, router),
            outcome,
        }
    }
}

/// A wired-up client: session store, reconciler and route guard.
///
/// Hand out [`store`](Self::store), [`outcome`](Self::outcome) and
/// [`flows`](Self::flows) first, then call [`run`](Self::run) (usually on
/// its own task).
pub struct BuzzerClient<I, D, R> {
    store: SessionStore<I, D>,
    reconciler: Reconciler<I, D>,
    guard: RouteGuard<R>,
    outcome: watch::Sender<GuardOutcome>,
}

impl BuzzerClient<(), (), ()> {
    /// Creates a new builder.
    pub fn builder() -> BuzzerClientBuilder {
        BuzzerClientBuilder::new()
    }
}

impl<I, D, R> BuzzerClient<I, D, R>
where
    I: IdentityClient,
    D: UserDirectory,
    R: Router,
{
    /// A handle to the session state.
    pub fn store(&self) -> SessionStore<I, D> {
        self.store.clone()
    }

    /// Observes what the page slot should show. Starts as the session
    /// loading placeholder.
    pub fn outcome(&self) -> watch::Receiver<GuardOutcome> {
        self.outcome.subscribe()
    }

    pub fn router(&self) -> &R {
        self.guard.router()
    }

    pub fn route_config(&self) -> &RouteConfig {
        self.guard.config()
    }

    /// Auth flows sharing this client's store, router and routes.
    pub fn flows(&self) -> AuthFlows<I, D, R>
    where
        R: Clone,
    {
        AuthFlows::new(
            self.store.clone(),
            self.guard.router().clone(),
            self.guard.config().clone(),
        )
    }

    /// Runs the client until the identity provider's session stream ends.
    ///
    /// Drives the reconciler and re-evaluates the guard whenever the session
    /// state or the router's path changes. Every evaluation result is
    /// published on [`outcome`](Self::outcome).
    pub async fn run(self) -> Result<(), BuzzerError> {
        let Self {
            store,
            reconciler,
            mut guard,
            outcome,
        } = self;

        tracing::info!("Buzzer client running");

        let mut states = store.watch();
        let mut paths = guard.router().subscribe();
        let mut router_open = true;

        let reconcile = reconciler.observe_external_session();
        tokio::pin!(reconcile);

        loop {
            let state = states.borrow_and_update().clone();
            paths.borrow_and_update();
            outcome.send_replace(guard.evaluate(&state));

            tokio::select! {
                () = &mut reconcile => break,
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = paths.changed(), if router_open => {
                    if changed.is_err() {
                        tracing::debug!("router stopped publishing paths");
                        router_open = false;
                    }
                }
            }
        }

        let state = store.state();
        outcome.send_replace(guard.evaluate(&state));
        tracing::info!(state = state.label(), "Buzzer client stopped");
        Ok(())
    }
}
