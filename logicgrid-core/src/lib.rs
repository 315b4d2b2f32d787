//! LogicGrid Core - shared error, configuration and logging infrastructure
//!
//! Every other crate in the workspace builds on the types defined here.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
