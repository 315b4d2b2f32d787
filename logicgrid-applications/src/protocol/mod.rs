//! Protocol records: ownership, visibility and fork-on-write saves

pub mod store;
pub mod types;

pub use store::ProtocolStore;
pub use types::*;
