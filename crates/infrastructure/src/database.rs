//! Database module - PostgreSQL connection pool and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use vcm_common::DatabaseConfig;

use crate::{Error, Result};

/// Migrations compiled into the binary from `crates/infrastructure/migrations`
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Database connection pool wrapper with health monitoring.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool for the configured URL.
    ///
    /// Every connection runs in UTC so timestamps round-trip unchanged.
    #[instrument(skip(config), fields(pool_size = config.pool_size))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::Configuration("database.url is not set".to_string()))?;

        info!("Initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.timeout_seconds))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("SET timezone = 'UTC'")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(url)
            .await
            .map_err(Error::Database)?;

        info!("Database pool initialized successfully");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get reference to the underlying pool.
    #[inline]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Check database health by executing a simple query.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthStatus {
        let start = Instant::now();

        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => {
                let latency = start.elapsed();
                debug!(latency_ms = latency.as_millis(), "Health check passed");
                HealthStatus {
                    healthy: true,
                    latency,
                    pool_size: self.pool.size(),
                    idle_connections: self.pool.num_idle(),
                    error: None,
                }
            }
            Err(e) => {
                let err = Error::from_sqlx(e);
                warn!(error = %err, retryable = err.is_retryable(), "Health check failed");
                HealthStatus {
                    healthy: false,
                    latency: start.elapsed(),
                    pool_size: self.pool.size(),
                    idle_connections: self.pool.num_idle(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

/// Health status for database connections.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub latency: Duration,
    pub pool_size: u32,
    pub idle_connections: usize,
    /// Error message if unhealthy
    pub error: Option<String>,
}
