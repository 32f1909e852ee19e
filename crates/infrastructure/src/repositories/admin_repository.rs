//! Admin directory backed by the `admin_users` table.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use vcm_application::ports::AdminDirectoryPort;
use vcm_application::ApplicationResult;
use vcm_domain::{AdminId, AdminPrincipal, AdminRole};

use super::parse_column;
use crate::{Error, Result};

const ADMIN_COLUMNS: &str = "id, username, name, email, role, department, designation, is_active";

pub struct PgAdminDirectory {
    pool: PgPool,
}

impl PgAdminDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_admin(row: &PgRow) -> Result<AdminPrincipal> {
        Ok(AdminPrincipal {
            id: AdminId::new(row.get("id")),
            username: row.get("username"),
            name: row.get("name"),
            email: row.get("email"),
            role: parse_column(row, "role")?,
            department: row.get("department"),
            designation: row.get("designation"),
            is_active: row.get("is_active"),
        })
    }
}

#[async_trait]
impl AdminDirectoryPort for PgAdminDirectory {
    #[instrument(skip(self))]
    async fn find(&self, id: AdminId) -> ApplicationResult<Option<AdminPrincipal>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_users WHERE id = $1",
            ADMIN_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_admin).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_active(&self, role: Option<AdminRole>) -> ApplicationResult<Vec<AdminPrincipal>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM admin_users
            WHERE is_active = TRUE AND ($1::TEXT IS NULL OR role = $1)
            ORDER BY name ASC, id ASC
            "#,
            ADMIN_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(Self::row_to_admin)
            .collect::<Result<Vec<_>>>()?)
    }
}
