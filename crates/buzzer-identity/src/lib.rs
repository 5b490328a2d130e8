//! Identity vocabulary for Buzzer.
//!
//! This crate defines what the rest of the workspace talks about when it
//! talks about "who is signed in":
//!
//! - **Types** ([`ExternalSession`], [`InternalUser`], [`UserId`], etc.):
//!   the two halves of an identity, one owned by the identity provider and
//!   one owned by the trivia backend.
//! - **Collaborators** ([`IdentityClient`], [`UserDirectory`]): the traits
//!   the provider SDK and the backend client implement.
//! - **Errors** ([`IdentityError`], [`LookupError`]) and the user-facing
//!   [`Feedback`] they map to.
//!
//! # Architecture
//!
//! ```text
//! Route layer (decides what to show)
//!     ↕
//! Session layer (reconciles the two identities)
//!     ↕
//! Identity layer (this crate)  ← types + collaborator contracts
//! ```

#![allow(async_fn_in_trait)]

mod client;
mod error;
mod feedback;
mod types;

pub use client::{IdentityClient, SessionEvents, UserDirectory};
pub use error::{IdentityError, IdentityErrorCode, LookupError};
pub use feedback::{Feedback, Severity};
pub use types::{Credentials, ExternalId, ExternalSession, InternalUser, UserId};
