//! Sign-in, sign-up and sign-out as the app's pages drive them.
//!
//! A flow runs the provider call, works out where the viewer should land,
//! waits for the session state to catch up, and navigates. Failures come
//! back as [`Feedback`] for the page to show; nothing is thrown past the
//! page.
//!
//! Waiting for the state matters: the route guard re-evaluates as soon as
//! the path changes, and landing on `/users/{id}` while the store still says
//! "signed out" would bounce the viewer straight back to the sign-in page.

use buzzer_identity::{
    Credentials, ExternalId, ExternalSession, Feedback, IdentityClient,
    InternalUser, UserDirectory, UserId,
};
use buzzer_route::{RouteConfig, Router};
use buzzer_session::{SessionState, SessionStore};
use serde::{Deserialize, Serialize};

use crate::BuzzerError;

/// Username given to provider sign-ups whose profile has no display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Display Name";

// ---------------------------------------------------------------------------
// Sign-up form
// ---------------------------------------------------------------------------

/// What the sign-up page collects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl SignUpForm {
    /// Required fields plus the provider's minimum password length.
    /// Everything else is left to the provider.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError {
                field: "username",
                message: "Username is required.",
            });
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError {
                field: "email",
                message: "Email is required.",
            });
        }

        if self.password.is_empty() {
            errors.push(FieldError {
                field: "password",
                message: "Password is required.",
            });
        } else if self.password.chars().count() < 6 {
            errors.push(FieldError {
                field: "password",
                message: "Password must be at least 6 characters long.",
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// The nav bar's "my page" link.
pub fn home_path(state: &SessionState, config: &RouteConfig) -> String {
    match state.internal_user() {
        Some(user) => config.user_route(user.id),
        None => config.sign_in_route.clone(),
    }
}

/// Auth flows bound to one store and router.
///
/// Obtained from [`BuzzerClient::flows`](crate::BuzzerClient::flows), or
/// built directly. Every flow returns the path it navigated to.
pub struct AuthFlows<I, D, R> {
    store: SessionStore<I, D>,
    router: R,
    config: RouteConfig,
}

impl<I, D, R> AuthFlows<I, D, R>
where
    I: IdentityClient,
    D: UserDirectory,
    R: Router,
{
    pub fn new(store: SessionStore<I, D>, router: R, config: RouteConfig) -> Self {
        Self {
            store,
            router,
            config,
        }
    }

    /// Email sign-in. Lands on the player's page, or on the sign-up page
    /// when the provider account has no player yet.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<String, Feedback> {
        let result = async {
            let session = self.store.sign_in(credentials).await?;
            self.land_existing(&session).await
        }
        .await;
        self.finish("sign_in", result)
    }

    /// Popup sign-in. Same landing rules as [`sign_in`](Self::sign_in).
    pub async fn sign_in_with_provider(&self) -> Result<String, Feedback> {
        let result = async {
            let session = self.provider_session().await?;
            self.land_existing(&session).await
        }
        .await;
        self.finish("sign_in_with_provider", result)
    }

    /// Email sign-up: provider account, then the player record.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String, Feedback> {
        if let Err(errors) = form.validate() {
            tracing::debug!(fields = errors.len(), "sign-up form rejected");
            let first = errors.first().map_or("Please check the form.", |e| e.message);
            return Err(Feedback::error(first));
        }

        let result = async {
            let session = self.store.sign_up(&form.credentials()).await?;
            let user = self.create_player(&form.username, &session.external_id).await?;
            self.land(&session.external_id, Some(user.id)).await
        }
        .await;
        self.finish("sign_up", result)
    }

    /// Popup sign-up. Reuses the player if the account already has one,
    /// otherwise creates one named after the provider profile.
    pub async fn sign_up_with_provider(&self) -> Result<String, Feedback> {
        let result = async {
            let session = self.provider_session().await?;
            let existing = self
                .store
                .directory()
                .find_by_external_id(&session.external_id)
                .await?;
            let user = match existing {
                Some(user) => {
                    tracing::debug!(user_id = %user.id, "player already exists");
                    user
                }
                None => {
                    let name = session
                        .display_name
                        .as_deref()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or(FALLBACK_DISPLAY_NAME);
                    self.create_player(name, &session.external_id).await?
                }
            };
            self.land(&session.external_id, Some(user.id)).await
        }
        .await;
        self.finish("sign_up_with_provider", result)
    }

    /// Signs out and shows the sign-in page.
    pub async fn sign_out(&self) -> Result<String, Feedback> {
        let result = async {
            self.store.sign_out().await?;
            Ok::<_, BuzzerError>(self.config.sign_in_route.clone())
        }
        .await;
        self.finish("sign_out", result)
    }

    // -- Helpers ---------------------------------------------------------

    async fn provider_session(&self) -> Result<ExternalSession, BuzzerError> {
        let session = self.store.sign_in_with_provider().await?;
        if session.external_id.as_str().is_empty() {
            return Err(BuzzerError::MissingAccount(
                "No user information returned from the provider.".into(),
            ));
        }
        Ok(session)
    }

    /// Creates the player and makes the reconciler pick it up.
    async fn create_player(
        &self,
        username: &str,
        external_id: &ExternalId,
    ) -> Result<InternalUser, BuzzerError> {
        let user = self.store.directory().create_user(username, external_id).await?;
        tracing::info!(user_id = %user.id, %username, "player created");
        self.store.refresh_user()?;
        Ok(user)
    }

    async fn land_existing(&self, session: &ExternalSession) -> Result<String, BuzzerError> {
        let user = self
            .store
            .directory()
            .find_by_external_id(&session.external_id)
            .await?;
        let user = user.map(|u| u.id);

        // Signing in again as the current account doesn't trigger a lookup,
        // so a record created elsewhere since then needs an explicit one.
        if outdated(&self.store.state(), &session.external_id, user) {
            tracing::debug!(external_id = %session.external_id, "refreshing outdated user");
            self.store.refresh_user()?;
        }
        self.land(&session.external_id, user).await
    }

    /// Waits until the store reflects `external_id` resolved to `user`,
    /// then picks the landing path.
    async fn land(
        &self,
        external_id: &ExternalId,
        user: Option<UserId>,
    ) -> Result<String, BuzzerError> {
        let mut store = self.store.clone();
        store
            .wait_for(|state| settled(state, external_id, user))
            .await?;

        Ok(match user {
            Some(id) => self.config.user_route(id),
            None => self.config.sign_up_route.clone(),
        })
    }

    fn finish(
        &self,
        flow: &'static str,
        result: Result<String, BuzzerError>,
    ) -> Result<String, Feedback> {
        match result {
            Ok(path) => {
                tracing::info!(flow, to = %path, "auth flow complete");
                self.router.navigate(&path);
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(flow, error = %e, "auth flow failed");
                Err(Feedback::from(&e))
            }
        }
    }
}

/// Whether `state` is the resolved form of the session a flow just produced.
///
/// A failed lookup for the same session also counts: the guard keeps
/// showing the loading placeholder for it, so landing is harmless.
fn settled(state: &SessionState, external_id: &ExternalId, user: Option<UserId>) -> bool {
    match state {
        SessionState::SignedIn { session, user: found } => {
            &session.external_id == external_id && found.as_ref().map(|u| u.id) == user
        }
        SessionState::LookupFailed { session, .. } => &session.external_id == external_id,
        _ => false,
    }
}

/// Whether `state` is already about `external_id` but disagrees with what
/// the directory just said about it.
fn outdated(state: &SessionState, external_id: &ExternalId, user: Option<UserId>) -> bool {
    match state {
        SessionState::CheckingUser { session } | SessionState::SignedIn { session, .. } => {
            &session.external_id == external_id && !settled(state, external_id, user)
        }
        _ => false,
    }
}
