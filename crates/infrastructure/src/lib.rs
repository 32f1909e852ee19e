//! Infrastructure layer for the village complaint service
//!
//! This crate provides the stores behind the application ports:
//! - Database access (PostgreSQL with sqlx) and bundled migrations
//! - Postgres repositories for complaints, ledger, notifications, admins and categories
//! - In-memory repositories with the same contracts, for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vcm_infrastructure::{DatabasePool, PgStores};
//!
//! let pool = DatabasePool::connect(&config.database).await?;
//! pool.migrate().await?;
//! let repositories = PgStores::new(pool).repositories();
//! ```

pub mod database;
pub mod memory;
pub mod repositories;

pub use database::{DatabasePool, HealthStatus};
pub use memory::{
    InMemoryAdminDirectory, InMemoryCategoryRepository, InMemoryComplaintRepository,
    InMemoryHealth, InMemoryHistoryRepository, InMemoryNotificationRepository, InMemoryStores,
    office_admins,
};
pub use repositories::{
    PgAdminDirectory, PgCategoryRepository, PgComplaintRepository, PgHistoryRepository,
    PgNotificationRepository, PgStores,
};

use vcm_application::ApplicationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value no longer parses into its domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Unique key taken or version moved on
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Classify a sqlx error, surfacing unique violations as conflicts
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Error::Conflict(db.message().to_string());
            }
        }
        Error::Database(err)
    }

    /// Whether retrying the same call might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(sqlx::Error::PoolTimedOut) | Error::Database(sqlx::Error::Io(_))
        )
    }
}

const UNIQUE_VIOLATION: &str = "23505";

impl From<Error> for ApplicationError {
    fn from(err: Error) -> Self {
        match err {
            Error::Conflict(msg) => ApplicationError::Conflict(msg),
            Error::NotFound(msg) => ApplicationError::NotFound(msg),
            Error::Configuration(msg) => ApplicationError::Internal(msg),
            other => ApplicationError::Storage(other.to_string()),
        }
    }
}
