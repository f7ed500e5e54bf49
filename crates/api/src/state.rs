use std::sync::Arc;

use vinco_core::error::CoreError;
use vinco_core::history::EditHistory;
use vinco_core::queue::ValidationQueue;
use vinco_core::store::{EditHistoryStore, QueueStore};
use vinco_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (JWT secret, queue tuning).
    pub config: Arc<ServerConfig>,
    /// Candidate ingestion, claims and resolution.
    pub queue: Arc<ValidationQueue>,
    /// Per-image edit snapshot log.
    pub history: Arc<EditHistory>,
    /// Review and edit events fan out from here.
    pub event_bus: Arc<EventBus>,
    /// Present only when running against PostgreSQL.
    pub pool: Option<vinco_db::DbPool>,
}

impl AppState {
    /// Wire the core services onto `store` using the queue settings in
    /// `config`.
    pub fn new<S>(
        config: ServerConfig,
        store: Arc<S>,
        event_bus: Arc<EventBus>,
        pool: Option<vinco_db::DbPool>,
    ) -> Result<Self, CoreError>
    where
        S: QueueStore + EditHistoryStore + 'static,
    {
        let policy = config.queue.policy()?;
        let queue = ValidationQueue::new(store.clone(), Arc::new(policy))
            .with_claim_ttl(config.queue.claim_ttl());

        Ok(Self {
            config: Arc::new(config),
            queue: Arc::new(queue),
            history: Arc::new(EditHistory::new(store)),
            event_bus,
            pool,
        })
    }
}
