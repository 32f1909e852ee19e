//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use vcm_application::ports::NotificationRepositoryPort;
use vcm_application::ApplicationResult;
use vcm_common::PaginationParams;
use vcm_domain::{
    AdminId, ComplaintId, NewNotification, Notification, NotificationId, Recipient, UserId,
};

use super::parse_column;
use crate::{Error, Result};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, admin_id, type, title, message, related_complaint_id, is_read, created_at";

/// PostgreSQL implementation of the notification store.
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: &PgRow) -> Result<Notification> {
        let user_id: Option<i64> = row.get("user_id");
        let admin_id: Option<i64> = row.get("admin_id");
        let recipient = match (user_id, admin_id) {
            (Some(user), None) => Recipient::Citizen(UserId::new(user)),
            (None, Some(admin)) => Recipient::Admin(AdminId::new(admin)),
            _ => {
                return Err(Error::Corrupt(format!(
                    "notification {} must have exactly one recipient",
                    row.get::<i64, _>("id")
                )))
            }
        };

        Ok(Notification {
            id: NotificationId::new(row.get("id")),
            recipient,
            kind: parse_column(row, "type")?,
            title: row.get("title"),
            message: row.get("message"),
            complaint_id: ComplaintId::new(row.get("related_complaint_id")),
            is_read: row.get("is_read"),
            created_at: row.get("created_at"),
        })
    }
}

/// Column and key identifying a recipient's rows
fn recipient_column(recipient: Recipient) -> (&'static str, i64) {
    match recipient {
        Recipient::Citizen(user) => ("user_id", user.value()),
        Recipient::Admin(admin) => ("admin_id", admin.value()),
    }
}

#[async_trait]
impl NotificationRepositoryPort for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(kind = %notification.kind))]
    async fn insert(&self, notification: NewNotification) -> ApplicationResult<Notification> {
        let (user_id, admin_id) = match notification.recipient {
            Recipient::Citizen(user) => (Some(user.value()), None),
            Recipient::Admin(admin) => (None, Some(admin.value())),
        };

        let sql = format!(
            r#"
            INSERT INTO notifications
                (user_id, admin_id, type, title, message, related_complaint_id, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(admin_id)
            .bind(notification.kind.as_str())
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.complaint_id.value())
            .bind(notification.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::from_sqlx)?;

        let stored = Self::row_to_notification(&row)?;
        debug!(notification_id = %stored.id, "Notification stored");
        Ok(stored)
    }

    #[instrument(skip(self, page))]
    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        unread_only: bool,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Notification>, u64)> {
        let (column, key) = recipient_column(recipient);
        let where_sql = format!("{} = $1 AND ($2 = FALSE OR is_read = FALSE)", column);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notifications WHERE {}",
            where_sql
        ))
        .bind(key)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT {} OFFSET {}
            "#,
            NOTIFICATION_COLUMNS,
            where_sql,
            page.limit(),
            page.offset()
        ))
        .bind(key)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let notifications = rows
            .iter()
            .map(Self::row_to_notification)
            .collect::<Result<Vec<_>>>()?;

        Ok((notifications, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, recipient: Recipient, id: NotificationId) -> ApplicationResult<bool> {
        let (column, key) = recipient_column(recipient);
        let result = sqlx::query(&format!(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND {} = $2",
            column
        ))
        .bind(id.value())
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, recipient: Recipient) -> ApplicationResult<u64> {
        let (column, key) = recipient_column(recipient);
        let result = sqlx::query(&format!(
            "UPDATE notifications SET is_read = TRUE WHERE {} = $1 AND is_read = FALSE",
            column
        ))
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(changed = result.rows_affected(), "Notifications marked read");
        Ok(result.rows_affected())
    }
}
