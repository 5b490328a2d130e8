//! Core identity types.
//!
//! A signed-in viewer has two identities that live in different systems:
//!
//! - an [`ExternalSession`], issued by the identity provider (email/password
//!   or a popup provider), keyed by a stable [`ExternalId`];
//! - an [`InternalUser`], the trivia backend's own record, keyed by a
//!   numeric [`UserId`] and pointing back at the provider via `external_id`.
//!
//! The session layer is responsible for keeping the two in step.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Primary key of an [`InternalUser`].
///
/// Newtype over `u64` so a user id can't be confused with a board or game
/// id. Serializes as the bare number (`42`, not `{ "0": 42 }`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Displays as the bare number because user ids appear in route paths
/// (`/users/42`).
impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity provider's stable identifier for an account.
///
/// Opaque to us: we never parse it, only compare it and hand it to the
/// [`UserDirectory`](crate::UserDirectory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Wraps a provider id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ExternalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// ExternalSession
// ---------------------------------------------------------------------------

/// A session issued by the identity provider.
///
/// Created when a sign-in succeeds and destroyed on sign-out. The provider
/// may also refresh it (new `id_token`, same `external_id`) while the
/// viewer stays signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSession {
    /// Stable account id. The join key into the user directory.
    pub external_id: ExternalId,

    /// The bearer credential the backend verifies, if the provider has
    /// issued one yet.
    #[serde(default)]
    pub id_token: Option<String>,

    /// Email on the provider account, when the provider shares it.
    #[serde(default)]
    pub email: Option<String>,

    /// Profile name from the provider (popup providers fill this in).
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ExternalSession {
    /// A session with only an id. Handy for providers that attach the
    /// token later, and for tests.
    pub fn new(external_id: impl Into<ExternalId>) -> Self {
        Self {
            external_id: external_id.into(),
            id_token: None,
            email: None,
            display_name: None,
        }
    }

    /// Attaches a credential token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Attaches a provider display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// `true` if the provider issued a non-empty credential token.
    pub fn has_credential(&self) -> bool {
        self.id_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// InternalUser
// ---------------------------------------------------------------------------

/// The trivia backend's record for a player.
///
/// Read-only from the client's point of view: it's created by the sign-up
/// flow through [`UserDirectory::create_user`](crate::UserDirectory::create_user)
/// and otherwise only fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalUser {
    pub id: UserId,
    pub external_id: ExternalId,
    pub username: String,
}

impl InternalUser {
    /// The canonical profile route for this user.
    pub fn profile_path(&self) -> String {
        format!("/users/{}", self.id)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Email/password pair for provider sign-in and sign-up.
///
/// `Debug` is hand-written so the password never lands in a log line.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display_is_bare_number() {
        assert_eq!(UserId(42).to_string(), "42");
    }

    #[test]
    fn test_user_id_serializes_transparently() {
        let json = serde_json::to_string(&UserId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_profile_path_uses_numeric_id() {
        let user = InternalUser {
            id: UserId(42),
            external_id: ExternalId::new("uid-abc"),
            username: "trebek".into(),
        };
        assert_eq!(user.profile_path(), "/users/42");
    }

    #[test]
    fn test_has_credential_requires_non_empty_token() {
        let bare = ExternalSession::new("uid-1");
        assert!(!bare.has_credential());

        let empty = ExternalSession::new("uid-1").with_token("");
        assert!(!empty.has_credential());

        let issued = ExternalSession::new("uid-1").with_token("eyJhbGciOi");
        assert!(issued.has_credential());
    }

    #[test]
    fn test_external_session_deserializes_with_missing_optionals() {
        let session: ExternalSession =
            serde_json::from_str(r#"{ "external_id": "uid-9" }"#).unwrap();
        assert_eq!(session.external_id.as_str(), "uid-9");
        assert!(session.id_token.is_none());
        assert!(session.display_name.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ken@example.com", "hunter22");
        let printed = format!("{creds:?}");
        assert!(printed.contains("ken@example.com"));
        assert!(!printed.contains("hunter22"));
    }
}
