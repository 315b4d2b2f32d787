//! User records and their persistence

pub mod store;
pub mod types;

pub use store::UserStore;
pub use types::*;
