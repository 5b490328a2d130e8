//! Unified error type for Buzzer.

use buzzer_identity::{Feedback, IdentityError, LookupError};
use buzzer_session::SessionError;

/// Top-level error wrapping the errors of each sub-crate.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum BuzzerError {
    /// A provider call failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A user-directory call failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The session layer failed or stopped.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A config document couldn't be parsed.
    #[error("invalid client config: {0}")]
    Config(#[from] serde_json::Error),

    /// The provider reported success without a usable account.
    #[error("provider returned no account: {0}")]
    MissingAccount(String),
}

impl From<&BuzzerError> for Feedback {
    fn from(err: &BuzzerError) -> Self {
        match err {
            BuzzerError::Identity(e) => Feedback::from(e),
            BuzzerError::Lookup(e) | BuzzerError::Session(SessionError::Lookup(e)) => {
                Feedback::from(e)
            }
            BuzzerError::Session(SessionError::Closed) | BuzzerError::Config(_) => {
                Feedback::error("Something went wrong. Please reload the page.")
            }
            BuzzerError::MissingAccount(msg) => Feedback::error(msg.clone()),
        }
    }
}
