//! Session reconciliation for Buzzer.
//!
//! A viewer's identity arrives in two stages:
//!
//! 1. **External session**: the identity provider says who signed in
//!    ([`ExternalSession`](buzzer_identity::ExternalSession)).
//! 2. **Internal user**: the trivia backend says which player record that
//!    account owns ([`InternalUser`](buzzer_identity::InternalUser)).
//!
//! The [`Reconciler`] listens to the provider and fetches the internal user
//! every time the external session changes, publishing the combined
//! [`SessionState`]. Everything else reads that state through a cloneable
//! [`SessionStore`].
//!
//! ```text
//! IdentityClient ──events──→ Reconciler ──lookups──→ UserDirectory
//!                                │
//!                          watch channel
//!                                ▼
//!                     SessionStore (route guard, pages)
//! ```

mod error;
mod reconciler;
mod state;
mod store;

pub use error::SessionError;
pub use reconciler::{LookupOutcome, LookupTicket, Reconciler, run_lookup};
pub use state::{AuthPhase, SessionConfig, SessionState};
pub use store::SessionStore;
