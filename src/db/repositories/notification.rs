//! Notification repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Notification, NotificationStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Save a new unread notification
    async fn create(&self, user_id: i64, kind: &str, message: &str) -> Result<Notification>;

    /// Notifications addressed to `user_id`, newest first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>>;

    /// Mark one of `user_id`'s notifications read; false when it is not theirs
    /// or does not exist
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool>;
}

pub struct SqlxNotificationRepository {
    pool: DynDatabasePool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, user_id: i64, kind: &str, message: &str) -> Result<Notification> {
        let now = Utc::now();
        let status = NotificationStatus::Unread;
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_NOTIFICATION)
                .bind(user_id)
                .bind(kind)
                .bind(message)
                .bind(status.to_string())
                .bind(now)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_NOTIFICATION)
                .bind(user_id)
                .bind(kind)
                .bind(message)
                .bind(status.to_string())
                .bind(now)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to save notification")?;

        Ok(Notification {
            id,
            user_id,
            kind: kind.to_string(),
            message: message.to_string(),
            status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(SELECT_FOR_USER)
                    .bind(user_id)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list notifications")?;
                Ok(rows.iter().map(row_to_notification_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(SELECT_FOR_USER)
                    .bind(user_id)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list notifications")?;
                Ok(rows.iter().map(row_to_notification_mysql).collect())
            }
        }
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        let now = Utc::now();
        let read = NotificationStatus::Read.to_string();
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(MARK_READ)
                .bind(&read)
                .bind(now)
                .bind(id)
                .bind(user_id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query(MARK_READ)
                .bind(&read)
                .bind(now)
                .bind(id)
                .bind(user_id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to mark notification read")?;

        Ok(affected > 0)
    }
}

const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (user_id, kind, message, status, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

const SELECT_FOR_USER: &str = r#"
    SELECT id, user_id, kind, message, status, created_at, updated_at
    FROM notifications
    WHERE user_id = ?
    ORDER BY created_at DESC, id DESC
"#;

const MARK_READ: &str =
    "UPDATE notifications SET status = ?, updated_at = ? WHERE id = ? AND user_id = ?";

fn row_to_notification_sqlite(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let status: String = row.get("status");
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        message: row.get("message"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_notification_mysql(row: &sqlx::mysql::MySqlRow) -> Notification {
    let status: String = row.get("status");
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        message: row.get("message"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::models::UserRole;

    #[tokio::test]
    async fn test_notifications_are_per_user() {
        let pool = setup_pool().await;
        let ana = insert_user(&pool, "ana@example.com", UserRole::Staff).await;
        let budi = insert_user(&pool, "budi@example.com", UserRole::Staff).await;
        let repo = SqlxNotificationRepository::new(pool);

        let n = repo.create(ana, "article", "New article").await.unwrap();
        repo.create(budi, "video", "New video").await.unwrap();

        let mine = repo.list_for_user(ana).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, NotificationStatus::Unread);

        assert!(!repo.mark_read(n.id, budi).await.unwrap());
        assert!(repo.mark_read(n.id, ana).await.unwrap());
        let mine = repo.list_for_user(ana).await.unwrap();
        assert_eq!(mine[0].status, NotificationStatus::Read);
    }
}
