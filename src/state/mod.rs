//! Client-side application state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the only long-lived state: the authenticated identity shared
//! by the guard, the coordinator, and every identity-aware screen.

pub mod session;
