use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vinco_api::background;
use vinco_api::config::{LogFormat, ServerConfig};
use vinco_api::router::build_app_router;
use vinco_api::state::AppState;
use vinco_core::store::MemoryStore;
use vinco_db::PgStore;
use vinco_events::{EventBus, EventLogger};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    // Parsed before tracing so LOG_FORMAT can pick the formatter.
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // --- Tracing ---
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vinco_api=debug,tower_http=debug".into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_cancel = CancellationToken::new();
    let logger_handle = tokio::spawn(EventLogger::run(event_bus.subscribe(), logger_cancel.clone()));

    // --- Store ---
    let state = match config.database_url.clone() {
        Some(database_url) => {
            let pool = vinco_db::create_pool(&database_url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            vinco_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            vinco_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store = Arc::new(PgStore::new(pool.clone()));
            AppState::new(config.clone(), store, Arc::clone(&event_bus), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (data is not persisted)");
            let store = Arc::new(MemoryStore::new());
            AppState::new(config.clone(), store, Arc::clone(&event_bus), None)
        }
    }
    .expect("Invalid queue policy");

    // --- Claim sweeper ---
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(background::claim_expiry::run(
        Arc::clone(&state.queue),
        Duration::from_secs(config.queue.claim_sweep_interval_secs),
        sweeper_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    sweeper_cancel.cancel();
    if tokio::time::timeout(grace, sweeper_handle).await.is_err() {
        tracing::warn!("Claim sweeper did not stop in time");
    }

    logger_cancel.cancel();
    if tokio::time::timeout(grace, logger_handle).await.is_err() {
        tracing::warn!("Event logger did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
