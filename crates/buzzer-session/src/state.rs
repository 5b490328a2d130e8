//! Session state: what the client currently knows about the viewer.
//!
//! The provider and the backend answer at different times, so the combined
//! view moves through several stages. Rather than four booleans
//! (`session`, `user`, `session_loading`, `user_loading`) with a pile of
//! illegal combinations, the state is a single enum where each variant
//! carries exactly the data that stage has.

use buzzer_identity::{ExternalSession, InternalUser};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Reconciliation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Re-run the user lookup when the provider re-emits the account that is
    /// already signed in (token refresh). Off by default: a refresh only
    /// swaps the stored session.
    pub refresh_on_same_identity: bool,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The reconciled identity of the viewer.
///
/// ```text
///                 first event: None
///  Initializing ──────────────────────→ SignedOut ←─────────┐
///       │                                  │                │ None
///       │ first event: Some(s)             │ Some(s)        │
///       ▼                                  ▼                │
///  CheckingUser ──lookup ok──→ SignedIn ───────────────────┤
///       │                                                   │
///       └──lookup failed──→ LookupFailed ──────────────────┘
/// ```
///
/// Any `Some(s)` for a different account moves back to `CheckingUser`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionState {
    /// The provider hasn't finished its initial session check.
    #[default]
    Initializing,

    /// Checked: nobody is signed in.
    SignedOut,

    /// Signed in with the provider; the backend lookup is in flight.
    CheckingUser { session: ExternalSession },

    /// Signed in with the provider, but the backend lookup failed.
    /// `reason` is the rendered [`LookupError`](buzzer_identity::LookupError).
    LookupFailed {
        session: ExternalSession,
        reason: String,
    },

    /// Fully resolved. `user` is `None` when the account has no backend
    /// record yet and needs to sign up.
    SignedIn {
        session: ExternalSession,
        user: Option<InternalUser>,
    },
}

impl SessionState {
    /// The provider session, if one exists.
    pub fn external_session(&self) -> Option<&ExternalSession> {
        match self {
            Self::Initializing | Self::SignedOut => None,
            Self::CheckingUser { session }
            | Self::LookupFailed { session, .. }
            | Self::SignedIn { session, .. } => Some(session),
        }
    }

    /// The backend user. Always `None` without an external session.
    pub fn internal_user(&self) -> Option<&InternalUser> {
        match self {
            Self::SignedIn { user, .. } => user.as_ref(),
            _ => None,
        }
    }

    /// `true` until the provider's initial check has reported.
    pub fn session_loading(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    /// `true` while a backend lookup is outstanding for the current session.
    pub fn user_loading(&self) -> bool {
        matches!(self, Self::CheckingUser { .. })
    }

    /// The phase the route guard reasons about.
    ///
    /// A failed lookup reports [`AuthPhase::CheckingUser`]: the viewer is
    /// signed in with the provider, so treating them as signed out would
    /// bounce them to the sign-in page for a backend hiccup.
    pub fn phase(&self) -> AuthPhase<'_> {
        match self {
            Self::Initializing => AuthPhase::Initializing,
            Self::SignedOut => AuthPhase::Unauthenticated,
            Self::CheckingUser { .. } | Self::LookupFailed { .. } => {
                AuthPhase::CheckingUser
            }
            Self::SignedIn { user, .. } => AuthPhase::Authenticated(user.as_ref()),
        }
    }

    /// Short name for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::SignedOut => "signed_out",
            Self::CheckingUser { .. } => "checking_user",
            Self::LookupFailed { .. } => "lookup_failed",
            Self::SignedIn { .. } => "signed_in",
        }
    }
}

// ---------------------------------------------------------------------------
// AuthPhase
// ---------------------------------------------------------------------------

/// Coarse view of [`SessionState`] for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase<'a> {
    Initializing,
    CheckingUser,
    Unauthenticated,
    /// Signed in and resolved; `None` means "needs sign-up".
    Authenticated(Option<&'a InternalUser>),
}
