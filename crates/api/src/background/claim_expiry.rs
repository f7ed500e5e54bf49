//! Periodic release of expired validation claims.
//!
//! Expired claims are already ignored by every queue operation; the sweep
//! keeps the claim table small and records the releases in the log.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use vinco_core::queue::ValidationQueue;

/// Run the claim sweep loop until `cancel` is triggered.
///
/// Returns the total number of claims released over the task's lifetime.
pub async fn run(queue: Arc<ValidationQueue>, every: Duration, cancel: CancellationToken) -> u64 {
    tracing::info!(interval_secs = every.as_secs(), "Claim expiry sweeper started");

    let mut interval = tokio::time::interval(every);
    let mut released_total = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(released_total, "Claim expiry sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match queue.expire_claims(Utc::now()).await {
                    Ok(0) => tracing::debug!("Claim sweep: nothing expired"),
                    Ok(released) => {
                        released_total += released;
                        tracing::warn!(released, "Claim sweep: released expired claims");
                    }
                    Err(e) => tracing::error!(error = %e, "Claim sweep failed"),
                }
            }
        }
    }

    released_total
}
