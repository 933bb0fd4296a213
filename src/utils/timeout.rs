//! Deadline helper for long-running operations

use crate::errors::ReadgoError;
use anyhow::{Result, anyhow};
use std::future::Future;
use std::time::Duration;

/// Run `fut` under `limit`, mapping expiry to [`ReadgoError::Timeout`]
///
/// With no limit the future simply runs to completion.
pub async fn with_timeout<T, F>(op: &str, limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => Err(ReadgoError::Timeout {
                op: op.to_string(),
                after,
            }
            .into()),
        },
        None => fut.await,
    }
}

/// Run blocking `work` on the blocking pool, racing it against `limit`
///
/// On expiry the caller gets [`ReadgoError::Timeout`] right away; the
/// detached work finishes in the background and its result is dropped.
pub async fn blocking_with_timeout<T, F>(op: &str, limit: Option<Duration>, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);
    with_timeout(op, limit, async {
        handle
            .await
            .map_err(|e| anyhow!("{} task failed: {}", op, e))?
    })
    .await
}
