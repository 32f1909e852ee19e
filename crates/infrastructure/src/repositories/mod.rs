//! PostgreSQL-backed implementations of the application ports.

mod admin_repository;
mod category_repository;
mod complaint_repository;
mod history_repository;
mod notification_repository;

pub use admin_repository::*;
pub use category_repository::*;
pub use complaint_repository::*;
pub use history_repository::*;
pub use notification_repository::*;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;
use vcm_application::ports::StoreHealthPort;
use vcm_application::{ApplicationError, ApplicationResult, Repositories};

use crate::database::DatabasePool;
use crate::{Error, Result};

/// Every Postgres repository over one pool
#[derive(Debug, Clone)]
pub struct PgStores {
    pool: DatabasePool,
}

impl PgStores {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Port handles for the application services
    pub fn repositories(&self) -> Repositories {
        let pg = self.pool.pool().clone();
        Repositories {
            complaints: Arc::new(PgComplaintRepository::new(pg.clone())),
            history: Arc::new(PgHistoryRepository::new(pg.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pg.clone())),
            admins: Arc::new(PgAdminDirectory::new(pg.clone())),
            categories: Arc::new(PgCategoryRepository::new(pg)),
            health: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl StoreHealthPort for PgStores {
    async fn check(&self) -> ApplicationResult<()> {
        let status = self.pool.health_check().await;
        if status.healthy {
            Ok(())
        } else {
            Err(ApplicationError::Storage(
                status
                    .error
                    .unwrap_or_else(|| "database unavailable".to_string()),
            ))
        }
    }
}

/// Read a text column and parse it into a domain enum
pub(crate) fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column).map_err(Error::Database)?;
    raw.parse()
        .map_err(|e: T::Err| Error::Corrupt(format!("{}: {}", column, e)))
}

/// Same as [`parse_column`] for nullable columns
pub(crate) fn parse_optional_column<T>(row: &PgRow, column: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = row.try_get(column).map_err(Error::Database)?;
    raw.map(|value| {
        value
            .parse()
            .map_err(|e: T::Err| Error::Corrupt(format!("{}: {}", column, e)))
    })
    .transpose()
}

/// ILIKE pattern matching `term` anywhere, with wildcards in the term escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("light"), "%light%");
        assert_eq!(contains_pattern("100%_done"), "%100\\%\\_done%");
    }
}
