//! Timeout wrapper for renderer operations

use std::future::Future;
use std::time::Duration;

use super::RenderError;

/// Run a renderer operation with an explicit deadline.
///
/// A hung page never blocks the crawl: when `timeout_secs` elapses the
/// operation is dropped and `RenderError::Timeout` names it.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout_secs: u64,
    operation_name: &str,
) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    match tokio::time::timeout(Duration::from_secs(timeout_secs), operation).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout {
            operation: operation_name.to_string(),
            secs: timeout_secs,
        }),
    }
}
