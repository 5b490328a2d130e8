//! # Buzzer
//!
//! Identity core of the Buzzer trivia client.
//!
//! Buzzer reconciles the identity provider's session with the trivia
//! backend's player record, and guards every navigation against the
//! result. The app supplies three collaborators (an
//! [`IdentityClient`](prelude::IdentityClient), a
//! [`UserDirectory`](prelude::UserDirectory) and a
//! [`Router`](prelude::Router)); Buzzer supplies the state machine.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buzzer::prelude::*;
//!
//! buzzer::logging::init();
//!
//! let client = BuzzerClient::builder()
//!     .route_config(RouteConfig::default())
//!     .build(provider, directory, router);
//!
//! let store = client.store();      // hand to pages, nav bar, flows
//! let outcome = client.outcome();  // what the page slot should show
//! client.run().await?;
//! ```

mod client;
mod config;
mod error;
pub mod flow;
pub mod logging;

pub use client::{BuzzerClient, BuzzerClientBuilder};
pub use config::ClientConfig;
pub use error::BuzzerError;

pub mod prelude {
    //! Everything an app needs to wire Buzzer up.

    pub use crate::flow::{AuthFlows, SignUpForm, home_path};
    pub use crate::{BuzzerClient, BuzzerClientBuilder, BuzzerError, ClientConfig};
    pub use buzzer_identity::{
        Credentials, ExternalId, ExternalSession, Feedback, IdentityClient,
        IdentityError, IdentityErrorCode, InternalUser, LookupError,
        SessionEvents, Severity, UserDirectory, UserId,
    };
    pub use buzzer_route::{
        GuardOutcome, LoadingKind, MemoryRouter, RouteConfig, RouteGuard, Router,
    };
    pub use buzzer_session::{SessionConfig, SessionError, SessionState, SessionStore};
}
