//! Structured-log sink for bus events.
//!
//! [`EventLogger`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! emits one `tracing` record per event, giving an audit trail of claims,
//! resolutions and edit saves without a dedicated events table.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::ReviewEvent;

/// Background service that logs every published event.
pub struct EventLogger;

impl EventLogger {
    /// Run until `cancel` fires or the bus is dropped. Returns the number of
    /// events logged.
    pub async fn run(mut receiver: broadcast::Receiver<ReviewEvent>, cancel: CancellationToken) -> u64 {
        let mut logged = 0u64;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(logged, "Event logger stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        Self::log(&event);
                        logged += 1;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(logged, "Event bus closed, event logger shutting down");
                        break;
                    }
                },
            }
        }
        logged
    }

    fn log(event: &ReviewEvent) {
        tracing::info!(
            event_type = %event.event_type,
            entity_type = event.entity_type.as_deref(),
            entity_id = event.entity_id,
            actor_id = event.actor_id,
            payload = %event.payload,
            "Review event"
        );
    }
}
