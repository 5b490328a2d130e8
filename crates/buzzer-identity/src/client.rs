//! Contracts for the two external identity collaborators.
//!
//! Buzzer doesn't talk to an identity provider or the trivia backend
//! itself. The app plugs in implementations of these traits (a provider
//! SDK binding and a GraphQL client, in production; in-memory fakes in
//! tests), and the session layer drives them.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    Credentials, ExternalId, ExternalSession, IdentityError, InternalUser,
    LookupError,
};

/// Stream of "current external session" notifications.
///
/// Each item is the provider's view after a change: `Some(session)` while
/// signed in, `None` once signed out (or when the initial check finds no
/// session). Items arrive in emission order.
pub type SessionEvents = mpsc::UnboundedReceiver<Option<ExternalSession>>;

/// The identity provider.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so one client can be shared (behind an `Arc`)
/// between the reconciler and the pages that trigger sign-in.
pub trait IdentityClient: Send + Sync + 'static {
    /// Starts a subscription to session changes.
    ///
    /// The first item reports the result of the provider's initial session
    /// check. Called once per store.
    fn subscribe(&self) -> SessionEvents;

    /// Creates a provider account and signs it in.
    fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send;

    /// Signs in with email and password.
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send;

    /// Signs in through the provider's popup flow.
    fn sign_in_with_provider(
        &self,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send;

    /// Ends the current session. Subscribers see a `None` afterwards.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// The trivia backend's user records.
pub trait UserDirectory: Send + Sync + 'static {
    /// Fetches the user linked to a provider account.
    ///
    /// # Returns
    /// - `Ok(Some(user))`: the account has a backend user
    /// - `Ok(None)`: signed in with the provider, but never signed up here
    /// - `Err(LookupError)`: the directory call itself failed
    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<Option<InternalUser>, LookupError>> + Send;

    /// Creates the backend user for a provider account.
    fn create_user(
        &self,
        username: &str,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<InternalUser, LookupError>> + Send;
}

impl<T: IdentityClient> IdentityClient for Arc<T> {
    fn subscribe(&self) -> SessionEvents {
        (**self).subscribe()
    }

    fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send {
        (**self).sign_up(credentials)
    }

    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send {
        (**self).sign_in(credentials)
    }

    fn sign_in_with_provider(
        &self,
    ) -> impl Future<Output = Result<ExternalSession, IdentityError>> + Send {
        (**self).sign_in_with_provider()
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).sign_out()
    }
}

impl<T: UserDirectory> UserDirectory for Arc<T> {
    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<Option<InternalUser>, LookupError>> + Send {
        (**self).find_by_external_id(external_id)
    }

    fn create_user(
        &self,
        username: &str,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<InternalUser, LookupError>> + Send {
        (**self).create_user(username, external_id)
    }
}
