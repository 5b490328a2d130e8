//! Error types for the identity layer.

use std::fmt;

// ---------------------------------------------------------------------------
// IdentityError
// ---------------------------------------------------------------------------

/// Reason codes reported by the identity provider.
///
/// The provider reports failures as `auth/<reason>` strings, usually wrapped
/// in a longer message such as `"Firebase: Error (auth/user-disabled)."`.
/// [`IdentityErrorCode::from_provider_code`] accepts either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    TooManyRequests,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    /// The viewer closed the provider popup before finishing.
    PopupClosed,
    /// A second popup request replaced the first one.
    PopupCancelled,
    /// The browser blocked the popup.
    PopupBlocked,
    UnsupportedEnvironment,
    NetworkRequestFailed,
    /// Any reason we don't have a dedicated message for. Keeps the raw code.
    Other(String),
}

impl IdentityErrorCode {
    /// Parses a provider reason code.
    ///
    /// ```rust
    /// use buzzer_identity::IdentityErrorCode;
    ///
    /// assert_eq!(
    ///     IdentityErrorCode::from_provider_code("Firebase: Error (auth/user-disabled)."),
    ///     IdentityErrorCode::UserDisabled,
    /// );
    /// ```
    pub fn from_provider_code(raw: &str) -> Self {
        let code = match raw.find("auth/") {
            Some(start) => {
                let tail = &raw[start..];
                let end = tail.find([')', ' ', '.']).unwrap_or(tail.len());
                &tail[..end]
            }
            None => raw.trim(),
        };

        match code {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword,
            "auth/popup-closed-by-user" => Self::PopupClosed,
            "auth/cancelled-popup-request" => Self::PopupCancelled,
            "auth/popup-blocked" => Self::PopupBlocked,
            "auth/operation-not-supported-in-this-environment" => {
                Self::UnsupportedEnvironment
            }
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The provider's spelling of this code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserDisabled => "auth/user-disabled",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::PopupClosed => "auth/popup-closed-by-user",
            Self::PopupCancelled => "auth/cancelled-popup-request",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::UnsupportedEnvironment => {
                "auth/operation-not-supported-in-this-environment"
            }
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for IdentityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed sign-in, sign-up, or sign-out call.
///
/// Propagated unchanged by the session layer; the UI turns it into a
/// [`Feedback`](crate::Feedback) for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identity provider error ({code}): {message}")]
pub struct IdentityError {
    /// What went wrong, as far as we can classify it.
    pub code: IdentityErrorCode,
    /// The provider's own description, kept for logs.
    pub message: String,
}

impl IdentityError {
    pub fn new(code: IdentityErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from the provider's raw message, extracting the
    /// reason code from it.
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code: IdentityErrorCode::from_provider_code(&message),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// LookupError
// ---------------------------------------------------------------------------

/// A failed call to the [`UserDirectory`](crate::UserDirectory).
///
/// "No such user" is not an error: lookups return `Ok(None)` for that.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The directory couldn't be reached (network, timeout, ...).
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    /// The directory answered with errors. `messages` holds the server's
    /// error strings in the order it reported them (may be empty).
    #[error("user directory rejected the request: {}", .messages.join("; "))]
    Rejected { messages: Vec<String> },
}
