//! Session Management Module
//!
//! Opaque, database-backed session tokens. A token is the only credential
//! needed to resolve a request to a user, so it is generated from the OS
//! random source and never logged in full.

pub mod manager;
pub mod types;

pub use manager::SessionManager;
pub use types::*;
