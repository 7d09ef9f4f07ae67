//! Bridge from async handlers to the synchronous managers
//!
//! redb transactions block, so manager calls run on the blocking pool and
//! are bounded by the configured storage timeout.

use std::time::Duration;

use shared::error::{AppError, AppResult};

use crate::error::ManagerResult;

/// Run a manager operation on the blocking pool
///
/// Expiry returns `TimeoutError` to the caller. The operation itself keeps
/// running and may still commit.
pub async fn run_blocking<T, F>(timeout: Duration, operation: &'static str, f: F) -> AppResult<T>
where
    F: FnOnce() -> ManagerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result.map_err(AppError::from),
        Ok(Err(e)) => {
            tracing::error!(operation, error = %e, "Blocking task failed");
            Err(AppError::internal(format!("{operation} failed")))
        }
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Storage operation timed out"
            );
            Err(AppError::timeout(format!(
                "{operation} did not finish within {}ms",
                timeout.as_millis()
            )))
        }
    }
}
