//! Tourbook client: session, HTTP transport, and navigation guard for the
//! tour-booking REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the backend, `state` holds the authenticated session,
//! `guard` and `router` decide where navigation lands, and `app` wires them
//! together and reacts to server-side session invalidation.

pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod net;
pub mod router;
pub mod state;
pub mod storage;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use config::ClientConfig;
pub use error::ApiError;
pub use net::client::{ApiClient, SessionSignal};
pub use state::session::{Session, SessionStore};
