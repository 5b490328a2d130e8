//! The route guard: applies [`decide`] through a [`Router`].

use buzzer_identity::UserId;
use buzzer_session::SessionState;

use crate::{Action, LoadingKind, RouteConfig, Router, decide, normalize_path};

/// What the page slot should show after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the requested page.
    Children,
    /// Render a placeholder.
    Loading(LoadingKind),
    /// A redirect to `to` is underway; render nothing.
    Redirecting { to: String },
}

/// The redirect most recently issued, and the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IssuedRedirect {
    from: String,
    user: Option<UserId>,
}

/// Gates page rendering on the session state.
///
/// Call [`evaluate`](Self::evaluate) whenever the session state or the path
/// changes. Each evaluation is [`decide`] plus one rule of its own: a
/// redirect is issued once per `(path, user)`. Re-evaluating while the
/// viewer is still on the path it just redirected away from (the router
/// hasn't caught up yet, or the state ticked for an unrelated reason)
/// doesn't push the same redirect again.
pub struct RouteGuard<R> {
    config: RouteConfig,
    router: R,
    last_redirect: Option<IssuedRedirect>,
}

impl<R: Router> RouteGuard<R> {
    pub fn new(config: RouteConfig, router: R) -> Self {
        Self {
            config,
            router,
            last_redirect: None,
        }
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Evaluates the router's current path.
    pub fn evaluate(&mut self, state: &SessionState) -> GuardOutcome {
        let path = self.router.current_path();
        self.evaluate_path(state, &path)
    }

    /// Evaluates an explicit path.
    pub fn evaluate_path(&mut self, state: &SessionState, path: &str) -> GuardOutcome {
        match decide(&self.config, state, path) {
            Action::Render => {
                self.last_redirect = None;
                GuardOutcome::Children
            }
            Action::ShowLoading(kind) => GuardOutcome::Loading(kind),
            Action::Redirect(to) => {
                let issued = IssuedRedirect {
                    from: normalize_path(path).to_string(),
                    user: state.internal_user().map(|u| u.id),
                };
                if self.last_redirect.as_ref() == Some(&issued) {
                    tracing::debug!(from = %issued.from, %to, "redirect already issued");
                } else {
                    tracing::info!(from = %issued.from, %to, state = state.label(), "redirecting");
                    self.router.navigate(&to);
                    self.last_redirect = Some(issued);
                }
                GuardOutcome::Redirecting { to }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use buzzer_identity::{ExternalId, ExternalSession, InternalUser};

    use super::*;
    use crate::MemoryRouter;

    fn guard() -> (RouteGuard<Arc<MemoryRouter>>, Arc<MemoryRouter>) {
        let router = Arc::new(MemoryRouter::new("/"));
        (
            RouteGuard::new(RouteConfig::default(), Arc::clone(&router)),
            router,
        )
    }

    fn signed_in(id: u64) -> SessionState {
        SessionState::SignedIn {
            session: ExternalSession::new("uid-1"),
            user: Some(InternalUser {
                id: UserId(id),
                external_id: ExternalId::new("uid-1"),
                username: "trebek".into(),
            }),
        }
    }

    #[test]
    fn test_evaluate_uses_router_path() {
        let (mut g, router) = guard();
        router.visit("/dashboard");

        let outcome = g.evaluate(&SessionState::SignedOut);

        assert_eq!(outcome, GuardOutcome::Redirecting { to: "/sign-in".into() });
        assert_eq!(router.navigations(), vec!["/sign-in".to_string()]);
    }

    #[test]
    fn test_redirect_again_after_leaving_and_returning() {
        let (mut g, router) = guard();

        g.evaluate_path(&SessionState::SignedOut, "/dashboard");
        g.evaluate_path(&SessionState::SignedOut, "/sign-in");
        g.evaluate_path(&SessionState::SignedOut, "/dashboard");

        assert_eq!(router.navigations().len(), 2);
    }

    #[test]
    fn test_redirect_again_when_user_changes_on_same_path() {
        let (mut g, router) = guard();

        g.evaluate_path(&signed_in(42), "/users/7");
        g.evaluate_path(&signed_in(43), "/users/7");

        assert_eq!(
            router.navigations(),
            vec!["/users/42".to_string(), "/users/43".to_string()]
        );
    }

    #[test]
    fn test_loading_between_evaluations_keeps_bookkeeping() {
        let (mut g, router) = guard();
        let checking = SessionState::CheckingUser {
            session: ExternalSession::new("uid-1"),
        };

        g.evaluate_path(&signed_in(42), "/users/7");
        g.evaluate_path(&checking, "/users/7");
        g.evaluate_path(&signed_in(42), "/users/7");

        assert_eq!(router.navigations().len(), 1);
    }

    #[test]
    fn test_query_string_does_not_defeat_idempotence() {
        let (mut g, router) = guard();

        g.evaluate_path(&SessionState::SignedOut, "/dashboard");
        g.evaluate_path(&SessionState::SignedOut, "/dashboard?tab=2");

        assert_eq!(router.navigations().len(), 1);
    }
}
