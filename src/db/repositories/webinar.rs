//! Webinar repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{CreateWebinarInput, Webinar};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait WebinarRepository: Send + Sync {
    async fn create(&self, input: &CreateWebinarInput) -> Result<Webinar>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Webinar>>;

    async fn list(&self) -> Result<Vec<Webinar>>;
}

pub struct SqlxWebinarRepository {
    pool: DynDatabasePool,
}

impl SqlxWebinarRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn WebinarRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl WebinarRepository for SqlxWebinarRepository {
    async fn create(&self, input: &CreateWebinarInput) -> Result<Webinar> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_WEBINAR)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.link_meet)
                .bind(input.host_id)
                .bind(now)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_WEBINAR)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.link_meet)
                .bind(input.host_id)
                .bind(now)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create webinar")?;

        Ok(Webinar {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            link_meet: input.link_meet.clone(),
            host_id: input.host_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Webinar>> {
        let sql = format!("{SELECT_WEBINAR} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get webinar by ID")?;
                Ok(row.as_ref().map(row_to_webinar_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get webinar by ID")?;
                Ok(row.as_ref().map(row_to_webinar_mysql))
            }
        }
    }

    async fn list(&self) -> Result<Vec<Webinar>> {
        let sql = format!("{SELECT_WEBINAR} ORDER BY created_at DESC, id DESC");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list webinars")?;
                Ok(rows.iter().map(row_to_webinar_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list webinars")?;
                Ok(rows.iter().map(row_to_webinar_mysql).collect())
            }
        }
    }
}

const INSERT_WEBINAR: &str = r#"
    INSERT INTO webinars (title, description, link_meet, host_id, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

const SELECT_WEBINAR: &str =
    "SELECT id, title, description, link_meet, host_id, created_at, updated_at FROM webinars";

fn row_to_webinar_sqlite(row: &sqlx::sqlite::SqliteRow) -> Webinar {
    Webinar {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        link_meet: row.get("link_meet"),
        host_id: row.get("host_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_webinar_mysql(row: &sqlx::mysql::MySqlRow) -> Webinar {
    Webinar {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        link_meet: row.get("link_meet"),
        host_id: row.get("host_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
