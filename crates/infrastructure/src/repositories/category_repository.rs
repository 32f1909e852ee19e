//! Category registry backed by `complaint_categories`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use vcm_application::ports::CategoryRepositoryPort;
use vcm_application::ApplicationResult;
use vcm_domain::{Category, CategoryId};

use crate::Error;

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_category(row: &PgRow) -> Category {
        Category {
            id: CategoryId::new(row.get("id")),
            name: row.get("name"),
            description: row.get("description"),
            is_active: row.get("is_active"),
        }
    }
}

#[async_trait]
impl CategoryRepositoryPort for PgCategoryRepository {
    #[instrument(skip(self))]
    async fn resolve_active(&self, name: &str) -> ApplicationResult<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, is_active
            FROM complaint_categories
            WHERE name = $1 AND is_active = TRUE
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_category))
    }

    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> ApplicationResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, description, is_active FROM complaint_categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_category))
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> ApplicationResult<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, is_active
            FROM complaint_categories
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_category).collect())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> ApplicationResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, description, is_active FROM complaint_categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_category).collect())
    }
}
