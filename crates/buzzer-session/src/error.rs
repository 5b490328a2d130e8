//! Error types for the session layer.

use buzzer_identity::LookupError;

/// Errors surfaced by reconciliation.
///
/// Provider failures from sign-in calls are NOT wrapped here: the store
/// hands back the provider's [`IdentityError`](buzzer_identity::IdentityError)
/// untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The user-directory lookup for the current session failed. The state
    /// records the failure; no retry is attempted.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The reconciler has stopped, so no further state changes will arrive.
    #[error("session reconciler has stopped")]
    Closed,
}
