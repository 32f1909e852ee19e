//! `vcm-api` server binary.
//!
//! Loads configuration, picks the stores (Postgres when `database.url` is
//! set, in memory otherwise) and serves until ctrl-c or SIGTERM.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use vcm_api_rest::{create_app, AppState};
use vcm_common::{
    init_tracing, AppConfig, Clock, CodeGenerator, SystemClock, TimestampCodeGenerator,
};
use vcm_infrastructure::{DatabasePool, PgStores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.telemetry)?;

    let (state, pool) = if config.database.url.is_some() {
        let pool = DatabasePool::connect(&config.database)
            .await
            .context("Failed to connect to database")?;
        if config.database.run_migrations {
            pool.migrate().await.context("Failed to run migrations")?;
        }

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let codes: Arc<dyn CodeGenerator> =
            Arc::new(TimestampCodeGenerator::new(Arc::clone(&clock)));
        let repositories = PgStores::new(pool.clone()).repositories();
        info!("Using PostgreSQL stores");
        (AppState::new(config.clone(), repositories, clock, codes), Some(pool))
    } else {
        warn!("No database configured, complaints will be kept in memory");
        (AppState::in_memory(config.clone()), None)
    };

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Village complaint API listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
