//! Status repository
//!
//! The single storage seam for workflow transitions. Table names come from
//! [`EntityKind::table`], never from caller input.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::EntityKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Current status of row `id`, or `None` if it does not exist
    async fn current_status(&self, kind: EntityKind, id: i64) -> Result<Option<String>>;

    /// Write `status` and `updated_at` for row `id` in one statement.
    /// Returns `false` if no row with `id` exists.
    async fn set_status(
        &self,
        kind: EntityKind,
        id: i64,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
}

pub struct SqlxStatusRepository {
    pool: DynDatabasePool,
}

impl SqlxStatusRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StatusRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StatusRepository for SqlxStatusRepository {
    async fn current_status(&self, kind: EntityKind, id: i64) -> Result<Option<String>> {
        let sql = format!("SELECT status FROM {} WHERE id = ?", kind.table());
        let status = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar::<_, String>(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
            }
            DatabaseDriver::Mysql => {
                sqlx::query_scalar::<_, String>(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
            }
        }
        .with_context(|| format!("Failed to read {} status", kind))?;

        Ok(status)
    }

    async fn set_status(
        &self,
        kind: EntityKind,
        id: i64,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let sql = format!(
            "UPDATE {} SET status = ?, updated_at = ? WHERE id = ?",
            kind.table()
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result = sqlx::query(&sql)
                    .bind(status)
                    .bind(updated_at)
                    .bind(id)
                    .execute(sqlite(&self.pool)?)
                    .await
                    .with_context(|| format!("Failed to update {} status", kind))?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let result = sqlx::query(&sql)
                    .bind(status)
                    .bind(updated_at)
                    .bind(id)
                    .execute(mysql(&self.pool)?)
                    .await
                    .with_context(|| format!("Failed to update {} status", kind))?;
                if result.rows_affected() > 0 {
                    return Ok(true);
                }
                // MySQL reports changed rows, not matched ones; an identical
                // write within the same second affects nothing.
                Ok(self.current_status(kind, id).await?.is_some())
            }
        }
    }
}
