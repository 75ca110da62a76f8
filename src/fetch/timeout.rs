//! Per-call timeout wrapper for fetch operations
//!
//! Every remote call made while inspecting is bounded by its own deadline. There
//! is no retry: a timed out call fails the inspection.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::errors::{FetchError, FetchResult};

/// Run a fetch operation, failing with [`FetchError::Timeout`] once `timeout_ms` elapses
pub async fn with_timeout<T, F>(operation: &str, timeout_ms: u64, future: F) -> FetchResult<T>
where
    F: Future<Output = FetchResult<T>>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            operation: operation.to_string(),
            timeout_ms,
        }),
    }
}

/// Translate a reqwest failure into a fetch error for `operation`
pub fn request_error(operation: &str, timeout_ms: u64, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            operation: operation.to_string(),
            timeout_ms,
        }
    } else {
        FetchError::RequestFailed {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
