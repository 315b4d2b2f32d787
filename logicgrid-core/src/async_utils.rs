//! Async utilities
//!
//! CPU-bound work (password hashing) must never run on a runtime worker
//! thread, so it is routed through [`run_blocking`].

use crate::error::{ErrorContext, LogicGridError, LogicGridResult};
use tracing::error;

/// Run a blocking closure on tokio's blocking pool and await its result
pub async fn run_blocking<F, T>(operation_name: &str, f: F) -> LogicGridResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!(
            operation = operation_name,
            error = %e,
            "Blocking task failed to complete"
        );
        LogicGridError::Internal {
            message: format!("Blocking task '{}' failed", operation_name),
            source: Some(Box::new(e)),
            context: ErrorContext::new("async_utils").with_operation(operation_name),
        }
    })
}
