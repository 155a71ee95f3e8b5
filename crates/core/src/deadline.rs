//! Request deadline shared by the services

use std::future::Future;
use std::time::Duration;

use patrolarc_domain::{PatrolArcError, Result};
use tracing::warn;

/// Await `fut` for at most `timeout`; a timeout surfaces as `StoreUnavailable`.
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, fut).await {
        result
    } else {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        warn!(operation, timeout_ms, "store call timed out");
        Err(PatrolArcError::StoreUnavailable(format!("{operation} timed out after {timeout_ms}ms")))
    }
}
