//! Networking modules for the tour-booking REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` is the single configured transport; `auth`, `tours`,
//! `reservations`, and `reviews` are thin per-resource wrappers over it, and
//! `types` defines the shared wire schema.

pub mod auth;
pub mod client;
pub mod reservations;
pub mod reviews;
pub mod tours;
pub mod types;
