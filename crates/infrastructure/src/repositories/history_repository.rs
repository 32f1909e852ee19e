//! Status history ledger repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use vcm_application::ports::StatusHistoryRepositoryPort;
use vcm_application::ApplicationResult;
use vcm_domain::{AdminId, ComplaintId, HistoryEntryId, NewHistoryEntry, StatusHistoryEntry};

use super::{parse_column, parse_optional_column};
use crate::{Error, Result};

/// PostgreSQL implementation of the append-only ledger.
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &PgRow) -> Result<StatusHistoryEntry> {
        Ok(StatusHistoryEntry {
            id: HistoryEntryId::new(row.get("id")),
            complaint_id: ComplaintId::new(row.get("complaint_id")),
            old_status: parse_optional_column(row, "old_status")?,
            new_status: parse_column(row, "new_status")?,
            comment: row.get("comments"),
            changed_by: row.get::<Option<i64>, _>("changed_by").map(AdminId::new),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl StatusHistoryRepositoryPort for PgHistoryRepository {
    #[instrument(skip(self, entry), fields(complaint_id = %entry.complaint_id))]
    async fn append(&self, entry: NewHistoryEntry) -> ApplicationResult<StatusHistoryEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO complaint_status_history
                (complaint_id, old_status, new_status, comments, changed_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, complaint_id, old_status, new_status, comments, changed_by, created_at
            "#,
        )
        .bind(entry.complaint_id.value())
        .bind(entry.old_status.map(|s| s.as_str()))
        .bind(entry.new_status.as_str())
        .bind(entry.comment.as_deref())
        .bind(entry.changed_by.map(|a| a.value()))
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from_sqlx)?;

        let stored = Self::row_to_entry(&row)?;
        debug!(entry_id = %stored.id, "Status history appended");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list_for_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> ApplicationResult<Vec<StatusHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, complaint_id, old_status, new_status, comments, changed_by, created_at
            FROM complaint_status_history
            WHERE complaint_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(complaint_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<Result<Vec<_>>>()?)
    }
}
