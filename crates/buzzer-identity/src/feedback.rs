//! User-facing feedback for failed auth calls.
//!
//! Errors from the provider and the directory carry machine-oriented
//! details. Pages want one sentence and a severity to pick an alert style,
//! so every error the auth flows can hit converts into a [`Feedback`].

use serde::{Deserialize, Serialize};

use crate::{IdentityError, IdentityErrorCode, LookupError};

/// Generic message for provider failures we don't recognize.
pub const GENERIC_SIGN_IN_MESSAGE: &str = "Error signing in. Please try again.";

/// Generic message for directory failures with no server-provided text.
pub const GENERIC_SERVER_MESSAGE: &str = "Server error occurred. Please try again.";

/// How loudly the UI should present a [`Feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

/// A severity plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub severity: Severity,
    pub message: String,
}

impl Feedback {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl From<&IdentityError> for Feedback {
    fn from(err: &IdentityError) -> Self {
        let message = match &err.code {
            IdentityErrorCode::UserNotFound => "No account found with this email",
            IdentityErrorCode::WrongPassword => "Incorrect password",
            IdentityErrorCode::InvalidEmail => "Invalid email format.",
            IdentityErrorCode::UserDisabled => "This account has been disabled.",
            IdentityErrorCode::TooManyRequests => {
                "Too many failed login attempts. Try again later."
            }
            IdentityErrorCode::InvalidCredential => {
                "Invalid email/password. Please try again."
            }
            IdentityErrorCode::EmailAlreadyInUse => {
                "An account with this email already exists."
            }
            IdentityErrorCode::WeakPassword => {
                "Password must be at least 6 characters long."
            }
            IdentityErrorCode::PopupClosed => "Authorization popup was closed.",
            IdentityErrorCode::PopupCancelled => {
                "Authorization request was cancelled."
            }
            IdentityErrorCode::PopupBlocked => "Authorization popup was blocked.",
            IdentityErrorCode::UnsupportedEnvironment => {
                "Provider sign-in is not supported in this environment."
            }
            IdentityErrorCode::NetworkRequestFailed => {
                "Network error occurred. Please try again."
            }
            IdentityErrorCode::Other(_) => GENERIC_SIGN_IN_MESSAGE,
        };
        Self::error(message)
    }
}

impl From<&LookupError> for Feedback {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::Rejected { messages } => match messages.first() {
                Some(first) => Self::error(first.clone()),
                None => Self::error(GENERIC_SERVER_MESSAGE),
            },
            LookupError::Unavailable(_) => Self::error(GENERIC_SERVER_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback_for(raw: &str) -> Feedback {
        Feedback::from(&IdentityError::from_provider_message(raw))
    }

    #[test]
    fn test_known_codes_map_to_distinct_messages() {
        let invalid = feedback_for("Firebase: Error (auth/invalid-credential).");
        let disabled = feedback_for("Firebase: Error (auth/user-disabled).");
        let limited = feedback_for("Firebase: Error (auth/too-many-requests).");
        let popup = feedback_for("Firebase: Error (auth/popup-closed-by-user).");

        let messages = [
            &invalid.message,
            &disabled.message,
            &limited.message,
            &popup.message,
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(disabled.message, "This account has been disabled.");
        assert_eq!(invalid.severity, Severity::Error);
    }

    #[test]
    fn test_unknown_code_falls_back_to_generic_message() {
        let fb = feedback_for("Firebase: Error (auth/internal-error).");
        assert_eq!(fb.message, GENERIC_SIGN_IN_MESSAGE);
    }

    #[test]
    fn test_lookup_rejected_uses_first_server_message() {
        let err = LookupError::Rejected {
            messages: vec!["username taken".into(), "second".into()],
        };
        assert_eq!(Feedback::from(&err).message, "username taken");
    }

    #[test]
    fn test_lookup_without_server_message_uses_generic() {
        let empty = LookupError::Rejected { messages: vec![] };
        let down = LookupError::Unavailable("connection refused".into());
        assert_eq!(Feedback::from(&empty).message, GENERIC_SERVER_MESSAGE);
        assert_eq!(Feedback::from(&down).message, GENERIC_SERVER_MESSAGE);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Feedback::error("nope")).unwrap();
        assert_eq!(json, r#"{"severity":"error","message":"nope"}"#);
    }
}
