//! The access decision, as a pure function.
//!
//! No router, no side effects: [`decide`] looks at the session state and a
//! path and says what should happen. [`RouteGuard`](crate::RouteGuard) is
//! the part that actually navigates.

use buzzer_session::{AuthPhase, SessionState};

use crate::{RouteClass, RouteConfig, normalize_path};

/// Which kind of loading placeholder to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingKind {
    /// Waiting for the identity provider's initial session check.
    Session,
    /// Signed in with the provider; waiting for the player record.
    User,
}

impl LoadingKind {
    /// Placeholder text for this phase.
    pub fn message(self) -> &'static str {
        match self {
            Self::Session => "Loading...",
            Self::User => "Loading your player profile...",
        }
    }
}

/// What the guard should do for one `(state, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do: render the page.
    Render,
    /// Render a placeholder instead of the page.
    ShowLoading(LoadingKind),
    /// Send the viewer to this path.
    Redirect(String),
}

/// Decides what to do with a navigation.
///
/// | phase                       | path                          | action                     |
/// |-----------------------------|-------------------------------|----------------------------|
/// | initializing                | any                           | loading (session)          |
/// | checking user / lookup failed | any                         | loading (user)             |
/// | signed out                  | public                        | render                     |
/// | signed out                  | anything else                 | redirect to sign-in        |
/// | signed in, user `u`         | `/users/{x}/...`, `x != u.id` | redirect to `/users/{u.id}`|
/// | signed in, no user          | `/users/{x}/...`              | redirect to sign-up        |
/// | signed in                   | anything else                 | render                     |
///
/// A redirect to the path the viewer is already on is turned into
/// [`Action::Render`].
pub fn decide(config: &RouteConfig, state: &SessionState, path: &str) -> Action {
    let class = config.classify(path);

    let action = match state.phase() {
        AuthPhase::Initializing => Action::ShowLoading(LoadingKind::Session),
        AuthPhase::CheckingUser => Action::ShowLoading(LoadingKind::User),
        AuthPhase::Unauthenticated => match class {
            RouteClass::Public => Action::Render,
            RouteClass::Protected | RouteClass::UserOwned { .. } => {
                Action::Redirect(config.sign_in_route.clone())
            }
        },
        AuthPhase::Authenticated(Some(user)) => match class {
            RouteClass::UserOwned { .. } if !class.is_owned_by(user.id) => {
                Action::Redirect(config.user_route(user.id))
            }
            _ => Action::Render,
        },
        AuthPhase::Authenticated(None) => match class {
            RouteClass::UserOwned { .. } => {
                Action::Redirect(config.sign_up_route.clone())
            }
            _ => Action::Render,
        },
    };

    match action {
        Action::Redirect(to) if normalize_path(&to) == normalize_path(path) => Action::Render,
        other => other,
    }
}
