use std::future::Future;
use std::time::Duration;

use crate::config::ANALYSIS;
use crate::errors::{AnalyticsError, Result};

/// Run a repository lookup with the configured timeout, retrying once on
/// failure. `NotFound` is a definitive answer and is never retried.
///
/// Callers treat the final error as "skip this item": batch operations log
/// it and move on.
pub async fn guarded<T, F, Fut>(id: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let timeout = Duration::from_millis(ANALYSIS.lookup.timeout_ms);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match tokio::time::timeout(timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e @ AnalyticsError::NotFound { .. })) => return Err(e),
            Ok(Err(e)) => {
                if attempt > ANALYSIS.lookup.retries {
                    return Err(e);
                }
                log::warn!("lookup for {id} failed (attempt {attempt}): {e}; retrying");
            }
            Err(_) => {
                if attempt > ANALYSIS.lookup.retries {
                    return Err(AnalyticsError::upstream(id, "lookup timed out"));
                }
                log::warn!("lookup for {id} timed out (attempt {attempt}); retrying");
            }
        }
    }
}
