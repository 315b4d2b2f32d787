//! HTTP handlers, one function per verb and path

pub mod accounts;
pub mod admin;
pub mod federation;
pub mod health;
pub mod protocols;
pub mod suggest;

pub use accounts::*;
pub use admin::*;
pub use federation::*;
pub use health::*;
pub use protocols::*;
pub use suggest::*;
