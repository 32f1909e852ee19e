//! Complaint repository implementation.
//!
//! Writes are guarded by the `version` column: an update only lands when the
//! stored version still matches the one the caller read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument, warn};

use vcm_application::ports::{ComplaintFilter, ComplaintRepositoryPort, ComplaintTally};
use vcm_application::ApplicationResult;
use vcm_common::PaginationParams;
use vcm_domain::{
    AdminId, CategoryId, Complaint, ComplaintCode, ComplaintId, ComplaintStatus, ContactInfo,
    NewComplaint, Office, Urgency, UserId,
};

use super::{contains_pattern, parse_column};
use crate::{Error, Result};

const COMPLAINT_COLUMNS: &str = r#"
    id, complaint_code, user_id, category_id, title, description, location, urgency,
    contact_name, contact_phone, contact_email, is_anonymous, attachments,
    status, current_office, assigned_to, version, created_at, updated_at, resolved_at
"#;

/// PostgreSQL implementation of the complaint store.
pub struct PgComplaintRepository {
    pool: PgPool,
}

impl PgComplaintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_complaint(row: &PgRow) -> Result<Complaint> {
        let code: String = row.get("complaint_code");
        let code = ComplaintCode::parse(&code)
            .map_err(|e| Error::Corrupt(format!("complaint_code: {}", e)))?;

        let contact_name: Option<String> = row.get("contact_name");
        let contact_phone: Option<String> = row.get("contact_phone");
        let contact = match (contact_name, contact_phone) {
            (Some(name), Some(phone)) => Some(ContactInfo {
                name,
                phone,
                email: row.get("contact_email"),
            }),
            _ => None,
        };

        let Json(attachments): Json<Vec<String>> = row.try_get("attachments")?;

        Ok(Complaint {
            id: ComplaintId::new(row.get("id")),
            code,
            title: row.get("title"),
            description: row.get("description"),
            location: row.get("location"),
            urgency: parse_column(row, "urgency")?,
            category_id: CategoryId::new(row.get("category_id")),
            submitter: row.get::<Option<i64>, _>("user_id").map(UserId::new),
            contact,
            is_anonymous: row.get("is_anonymous"),
            attachments,
            status: parse_column(row, "status")?,
            current_office: parse_column(row, "current_office")?,
            assigned_to: row.get::<Option<i64>, _>("assigned_to").map(AdminId::new),
            version: row.get("version"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            resolved_at: row.get("resolved_at"),
        })
    }

    async fn exists(&self, id: ComplaintId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM complaints WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn grouped_counts(&self, column: &str, office: Option<&str>) -> Result<Vec<PgRow>> {
        let sql = format!(
            r#"
            SELECT {column} AS key, COUNT(*) AS n
            FROM complaints
            WHERE ($1::TEXT IS NULL OR current_office = $1)
            GROUP BY {column}
            ORDER BY {column}
            "#
        );
        sqlx::query(&sql)
            .bind(office)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }
}

/// Positional bind values collected while building a WHERE clause
enum FilterValue {
    Text(String),
    Id(i64),
}

fn where_clause(filter: &ComplaintFilter) -> (String, Vec<FilterValue>) {
    let mut conditions = vec!["TRUE".to_string()];
    let mut binds = Vec::new();

    if let Some(office) = filter.office {
        binds.push(FilterValue::Text(office.as_str().to_string()));
        conditions.push(format!("current_office = ${}", binds.len()));
    }
    if let Some(status) = filter.status {
        binds.push(FilterValue::Text(status.as_str().to_string()));
        conditions.push(format!("status = ${}", binds.len()));
    }
    if let Some(urgency) = filter.urgency {
        binds.push(FilterValue::Text(urgency.as_str().to_string()));
        conditions.push(format!("urgency = ${}", binds.len()));
    }
    if let Some(category_id) = filter.category_id {
        binds.push(FilterValue::Id(category_id.value()));
        conditions.push(format!("category_id = ${}", binds.len()));
    }
    if let Some(submitter) = filter.submitter {
        binds.push(FilterValue::Id(submitter.value()));
        conditions.push(format!("user_id = ${}", binds.len()));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        binds.push(FilterValue::Text(contains_pattern(term)));
        let n = binds.len();
        conditions.push(format!(
            "(title ILIKE ${n} OR description ILIKE ${n} OR complaint_code ILIKE ${n})"
        ));
    }

    (conditions.join(" AND "), binds)
}

#[async_trait]
impl ComplaintRepositoryPort for PgComplaintRepository {
    #[instrument(skip(self, complaint), fields(code = %complaint.code))]
    async fn insert(&self, complaint: NewComplaint) -> ApplicationResult<Complaint> {
        let draft = complaint.withhold_contact_if_anonymous();
        let (contact_name, contact_phone, contact_email) = match &draft.contact {
            Some(contact) => (
                Some(contact.name.as_str()),
                Some(contact.phone.as_str()),
                contact.email.as_deref(),
            ),
            None => (None, None, None),
        };

        let sql = format!(
            r#"
            INSERT INTO complaints (
                complaint_code, user_id, category_id, title, description, location, urgency,
                contact_name, contact_phone, contact_email, is_anonymous, attachments,
                status, current_office, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 1, $15, $15)
            RETURNING {}
            "#,
            COMPLAINT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(draft.code.as_str())
            .bind(draft.submitter.map(|u| u.value()))
            .bind(draft.category_id.value())
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.location)
            .bind(draft.urgency.as_str())
            .bind(contact_name)
            .bind(contact_phone)
            .bind(contact_email)
            .bind(draft.is_anonymous)
            .bind(Json(&draft.attachments))
            .bind(ComplaintStatus::Pending.as_str())
            .bind(Office::UnionOffice.as_str())
            .bind(draft.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::from_sqlx)?;

        let complaint = Self::row_to_complaint(&row)?;
        debug!(complaint_id = %complaint.id, "Complaint inserted");
        Ok(complaint)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ComplaintId) -> ApplicationResult<Option<Complaint>> {
        let sql = format!("SELECT {} FROM complaints WHERE id = $1", COMPLAINT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_complaint).transpose()?)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn find_by_code(&self, code: &ComplaintCode) -> ApplicationResult<Option<Complaint>> {
        let sql = format!(
            "SELECT {} FROM complaints WHERE complaint_code = $1",
            COMPLAINT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_complaint).transpose()?)
    }

    #[instrument(
        skip(self, complaint),
        fields(complaint_id = %complaint.id, version = complaint.version)
    )]
    async fn update(&self, complaint: &Complaint) -> ApplicationResult<Complaint> {
        let sql = format!(
            r#"
            UPDATE complaints SET
                status = $3,
                current_office = $4,
                assigned_to = $5,
                updated_at = $6,
                resolved_at = $7,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            COMPLAINT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(complaint.id.value())
            .bind(complaint.version)
            .bind(complaint.status.as_str())
            .bind(complaint.current_office.as_str())
            .bind(complaint.assigned_to.map(|a| a.value()))
            .bind(complaint.updated_at)
            .bind(complaint.resolved_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from_sqlx)?;

        match row {
            Some(row) => {
                let stored = Self::row_to_complaint(&row)?;
                debug!(version = stored.version, "Complaint updated");
                Ok(stored)
            }
            None if self.exists(complaint.id).await? => {
                warn!("Complaint changed since it was read");
                Err(Error::Conflict(format!(
                    "Complaint {} was modified concurrently",
                    complaint.id
                ))
                .into())
            }
            None => Err(Error::NotFound(format!("Complaint {}", complaint.id)).into()),
        }
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Complaint>, u64)> {
        let (where_sql, binds) = where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM complaints WHERE {}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = match value {
                FilterValue::Text(text) => count_query.bind(text.clone()),
                FilterValue::Id(id) => count_query.bind(*id),
            };
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let list_sql = format!(
            r#"
            SELECT {}
            FROM complaints
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT {} OFFSET {}
            "#,
            COMPLAINT_COLUMNS,
            where_sql,
            page.limit(),
            page.offset()
        );
        let mut list_query = sqlx::query(&list_sql);
        for value in &binds {
            list_query = match value {
                FilterValue::Text(text) => list_query.bind(text.clone()),
                FilterValue::Id(id) => list_query.bind(*id),
            };
        }
        let rows = list_query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let complaints = rows
            .iter()
            .map(Self::row_to_complaint)
            .collect::<Result<Vec<_>>>()?;

        Ok((complaints, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn tally(
        &self,
        office: Option<Office>,
        created_since: DateTime<Utc>,
    ) -> ApplicationResult<ComplaintTally> {
        let office = office.map(|o| o.as_str());

        let totals = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE created_at >= $2) AS recent
            FROM complaints
            WHERE ($1::TEXT IS NULL OR current_office = $1)
            "#,
        )
        .bind(office)
        .bind(created_since)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let count = |row: &PgRow| row.get::<i64, _>("n").max(0) as u64;

        let by_status = self
            .grouped_counts("status", office)
            .await?
            .iter()
            .map(|row| Ok((parse_column::<ComplaintStatus>(row, "key")?, count(row))))
            .collect::<Result<Vec<_>>>()?;

        let by_urgency = self
            .grouped_counts("urgency", office)
            .await?
            .iter()
            .map(|row| Ok((parse_column::<Urgency>(row, "key")?, count(row))))
            .collect::<Result<Vec<_>>>()?;

        let by_category = self
            .grouped_counts("category_id", office)
            .await?
            .iter()
            .map(|row| (CategoryId::new(row.get("key")), count(row)))
            .collect();

        Ok(ComplaintTally {
            total: totals.get::<i64, _>("total").max(0) as u64,
            by_status,
            by_urgency,
            by_category,
            created_since: totals.get::<i64, _>("recent").max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_binds() {
        let (sql, binds) = where_clause(&ComplaintFilter::default());
        assert_eq!(sql, "TRUE");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_filter_placeholders_are_numbered_in_order() {
        let filter = ComplaintFilter {
            office: Some(Office::CollectorOffice),
            category_id: Some(CategoryId::new(3)),
            search: Some("drain".to_string()),
            ..Default::default()
        };
        let (sql, binds) = where_clause(&filter);
        assert_eq!(binds.len(), 3);
        assert!(sql.contains("current_office = $1"));
        assert!(sql.contains("category_id = $2"));
        assert!(sql.contains("complaint_code ILIKE $3"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = ComplaintFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let (_, binds) = where_clause(&filter);
        assert!(binds.is_empty());
    }
}
