//! Route access control for Buzzer.
//!
//! Given the reconciled session and the path the viewer asked for, decide
//! whether to show the page, show a loading placeholder, or send the viewer
//! somewhere else.
//!
//! # Key types
//!
//! - [`RouteConfig`]: which routes are public, where sign-in lives, etc.
//! - [`decide`]: the pure decision, `(config, state, path) -> Action`
//! - [`RouteGuard`]: applies decisions through a [`Router`], issuing each
//!   redirect once
//! - [`MemoryRouter`]: an in-process [`Router`] for tests and demos

mod config;
mod decide;
mod guard;
mod router;

pub use config::{RouteClass, RouteConfig, normalize_path};
pub use decide::{Action, LoadingKind, decide};
pub use guard::{GuardOutcome, RouteGuard};
pub use router::{MemoryRouter, Router};
