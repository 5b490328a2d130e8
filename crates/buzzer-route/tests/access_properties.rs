//! Access-control properties of the route guard, checked against a
//! recording router.

use std::sync::Arc;

use buzzer_identity::{ExternalId, ExternalSession, InternalUser, UserId};
use buzzer_route::{GuardOutcome, LoadingKind, MemoryRouter, RouteConfig, RouteGuard, Router};
use buzzer_session::SessionState;

// =========================================================================
// Helpers
// =========================================================================

fn guard_at(path: &str) -> (RouteGuard<Arc<MemoryRouter>>, Arc<MemoryRouter>) {
    let router = Arc::new(MemoryRouter::new(path));
    (
        RouteGuard::new(RouteConfig::default(), Arc::clone(&router)),
        router,
    )
}

fn session() -> ExternalSession {
    ExternalSession::new("uid-1").with_token("token")
}

fn user(id: u64) -> InternalUser {
    InternalUser {
        id: UserId(id),
        external_id: ExternalId::new("uid-1"),
        username: format!("player{id}"),
    }
}

fn signed_in(id: u64) -> SessionState {
    SessionState::SignedIn {
        session: session(),
        user: Some(user(id)),
    }
}

/// Every state a viewer can be in, for "for all states" style checks.
fn all_states() -> Vec<SessionState> {
    vec![
        SessionState::Initializing,
        SessionState::SignedOut,
        SessionState::CheckingUser { session: session() },
        SessionState::LookupFailed {
            session: session(),
            reason: "down".into(),
        },
        SessionState::SignedIn {
            session: session(),
            user: None,
        },
        signed_in(42),
    ]
}

const PATHS: [&str; 7] = [
    "/",
    "/sign-in",
    "/sign-up",
    "/dashboard",
    "/users/42",
    "/users/7",
    "/users/7/boards/3",
];

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_no_redirect_while_session_loading() {
    for path in PATHS {
        let (mut guard, router) = guard_at(path);

        let outcome = guard.evaluate(&SessionState::Initializing);

        assert_eq!(outcome, GuardOutcome::Loading(LoadingKind::Session), "{path}");
        assert!(router.navigations().is_empty(), "{path}");
    }
}

#[test]
fn test_signed_out_on_protected_path_redirects_once_to_sign_in() {
    let (mut guard, router) = guard_at("/dashboard");

    let outcome = guard.evaluate_path(&SessionState::SignedOut, "/dashboard");

    assert_eq!(outcome, GuardOutcome::Redirecting { to: "/sign-in".into() });
    assert_eq!(router.navigations(), vec!["/sign-in".to_string()]);
}

#[test]
fn test_signed_out_on_sign_in_renders_without_redirect() {
    let (mut guard, router) = guard_at("/sign-in");

    let outcome = guard.evaluate(&SessionState::SignedOut);

    assert_eq!(outcome, GuardOutcome::Children);
    assert!(router.navigations().is_empty());
}

#[test]
fn test_foreign_user_page_redirects_once_to_own_page() {
    let (mut guard, router) = guard_at("/users/7");

    let outcome = guard.evaluate(&signed_in(42));

    assert_eq!(outcome, GuardOutcome::Redirecting { to: "/users/42".into() });
    assert_eq!(router.navigations(), vec!["/users/42".to_string()]);
}

#[test]
fn test_identical_reevaluation_after_redirect_does_not_redirect_again() {
    // The path is passed explicitly, as if the router hadn't moved yet.
    for (state, path) in [
        (SessionState::SignedOut, "/dashboard"),
        (signed_in(42), "/users/7"),
        (signed_in(42), "/users/7/boards/3"),
    ] {
        let (mut guard, router) = guard_at(path);

        let first = guard.evaluate_path(&state, path);
        let second = guard.evaluate_path(&state, path);
        let third = guard.evaluate_path(&state, path);

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(router.navigations().len(), 1, "{path}");
    }
}

#[test]
fn test_at_most_one_navigation_per_evaluation_for_all_inputs() {
    for state in all_states() {
        for path in PATHS {
            let (mut guard, router) = guard_at(path);
            guard.evaluate_path(&state, path);
            guard.evaluate_path(&state, path);
            assert!(
                router.navigations().len() <= 1,
                "{state:?} at {path} navigated {:?}",
                router.navigations()
            );
        }
    }
}

#[test]
fn test_no_user_is_ever_routed_to_someone_elses_page() {
    for state in all_states() {
        for path in PATHS {
            let (mut guard, router) = guard_at(path);
            guard.evaluate(&state);
            for target in router.navigations() {
                if let Some(user) = state.internal_user() {
                    if target.starts_with("/users/") {
                        assert_eq!(target, format!("/users/{}", user.id));
                    }
                } else {
                    assert!(!target.starts_with("/users/"), "{state:?}: {target}");
                }
            }
        }
    }
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_scenario_loading_then_signed_out_on_dashboard() {
    let (mut guard, router) = guard_at("/dashboard");

    assert_eq!(
        guard.evaluate_path(&SessionState::Initializing, "/dashboard"),
        GuardOutcome::Loading(LoadingKind::Session)
    );
    assert!(router.navigations().is_empty());

    guard.evaluate_path(&SessionState::SignedOut, "/dashboard");

    assert_eq!(router.navigations(), vec!["/sign-in".to_string()]);
}

#[test]
fn test_scenario_pending_lookup_on_own_page_waits() {
    let (mut guard, router) = guard_at("/users/42");
    let checking = SessionState::CheckingUser { session: session() };

    for _ in 0..3 {
        assert_eq!(
            guard.evaluate(&checking),
            GuardOutcome::Loading(LoadingKind::User)
        );
    }
    assert!(router.navigations().is_empty());

    assert_eq!(guard.evaluate(&signed_in(42)), GuardOutcome::Children);
    assert!(router.navigations().is_empty());
}

#[test]
fn test_scenario_router_follows_redirect_then_renders() {
    let (mut guard, router) = guard_at("/users/7");

    guard.evaluate(&signed_in(42));
    // MemoryRouter moves on navigate, so the next evaluation sees /users/42.
    assert_eq!(router.current_path(), "/users/42");
    assert_eq!(guard.evaluate(&signed_in(42)), GuardOutcome::Children);
    assert_eq!(router.navigations().len(), 1);
}
