//! Testimonial repository
//!
//! `update` and `delete` accept an optional status guard so a caller can
//! restrict the write to rows still in a given state in one statement.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{CreateTestimonialInput, ModerationStatus, Testimonial};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn create(
        &self,
        input: &CreateTestimonialInput,
        status: ModerationStatus,
    ) -> Result<Testimonial>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Testimonial>>;

    /// Newest first, optionally filtered by status
    async fn list(&self, status: Option<ModerationStatus>) -> Result<Vec<Testimonial>>;

    /// Write the editable fields; returns false when no row matched
    async fn update(
        &self,
        testimonial: &Testimonial,
        guard: Option<ModerationStatus>,
    ) -> Result<bool>;

    async fn delete(&self, id: i64, guard: Option<ModerationStatus>) -> Result<bool>;
}

pub struct SqlxTestimonialRepository {
    pool: DynDatabasePool,
}

impl SqlxTestimonialRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TestimonialRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Append `AND status = ?` when guarded
fn guarded(base: &str, guard: Option<ModerationStatus>) -> String {
    match guard {
        Some(_) => format!("{base} AND status = ?"),
        None => base.to_string(),
    }
}

#[async_trait]
impl TestimonialRepository for SqlxTestimonialRepository {
    async fn create(
        &self,
        input: &CreateTestimonialInput,
        status: ModerationStatus,
    ) -> Result<Testimonial> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_TESTIMONIAL)
                .bind(&input.name)
                .bind(&input.comment)
                .bind(&input.photo_profile)
                .bind(input.category_id)
                .bind(status.as_str())
                .bind(now)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_TESTIMONIAL)
                .bind(&input.name)
                .bind(&input.comment)
                .bind(&input.photo_profile)
                .bind(input.category_id)
                .bind(status.as_str())
                .bind(now)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create testimonial")?;

        Ok(Testimonial {
            id,
            name: input.name.clone(),
            comment: input.comment.clone(),
            photo_profile: input.photo_profile.clone(),
            category_id: input.category_id,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Testimonial>> {
        let sql = format!("{SELECT_TESTIMONIAL} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get testimonial by ID")?;
                Ok(row.as_ref().map(row_to_testimonial_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get testimonial by ID")?;
                Ok(row.as_ref().map(row_to_testimonial_mysql))
            }
        }
    }

    async fn list(&self, status: Option<ModerationStatus>) -> Result<Vec<Testimonial>> {
        let filter = if status.is_some() { " WHERE status = ?" } else { "" };
        let sql = format!("{SELECT_TESTIMONIAL}{filter} ORDER BY created_at DESC, id DESC");
        let status = status.map(ModerationStatus::as_str);

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                if let Some(status) = status {
                    query = query.bind(status);
                }
                let rows = query
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list testimonials")?;
                Ok(rows.iter().map(row_to_testimonial_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                if let Some(status) = status {
                    query = query.bind(status);
                }
                let rows = query
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list testimonials")?;
                Ok(rows.iter().map(row_to_testimonial_mysql).collect())
            }
        }
    }

    async fn update(
        &self,
        testimonial: &Testimonial,
        guard: Option<ModerationStatus>,
    ) -> Result<bool> {
        let now = Utc::now();
        let sql = guarded(UPDATE_TESTIMONIAL, guard);
        let guard = guard.map(ModerationStatus::as_str);

        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql)
                    .bind(&testimonial.name)
                    .bind(&testimonial.comment)
                    .bind(&testimonial.photo_profile)
                    .bind(testimonial.category_id)
                    .bind(now)
                    .bind(testimonial.id);
                if let Some(status) = guard {
                    query = query.bind(status);
                }
                query
                    .execute(sqlite(&self.pool)?)
                    .await
                    .map(|r| r.rows_affected())
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql)
                    .bind(&testimonial.name)
                    .bind(&testimonial.comment)
                    .bind(&testimonial.photo_profile)
                    .bind(testimonial.category_id)
                    .bind(now)
                    .bind(testimonial.id);
                if let Some(status) = guard {
                    query = query.bind(status);
                }
                query
                    .execute(mysql(&self.pool)?)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .context("Failed to update testimonial")?;

        Ok(affected > 0)
    }

    async fn delete(&self, id: i64, guard: Option<ModerationStatus>) -> Result<bool> {
        let sql = guarded("DELETE FROM testimonials WHERE id = ?", guard);
        let guard = guard.map(ModerationStatus::as_str);

        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql).bind(id);
                if let Some(status) = guard {
                    query = query.bind(status);
                }
                query
                    .execute(sqlite(&self.pool)?)
                    .await
                    .map(|r| r.rows_affected())
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql).bind(id);
                if let Some(status) = guard {
                    query = query.bind(status);
                }
                query
                    .execute(mysql(&self.pool)?)
                    .await
                    .map(|r| r.rows_affected())
            }
        }
        .context("Failed to delete testimonial")?;

        Ok(affected > 0)
    }
}

const INSERT_TESTIMONIAL: &str = r#"
    INSERT INTO testimonials (name, comment, photo_profile, category_id, status, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_TESTIMONIAL: &str = r#"
    UPDATE testimonials
    SET name = ?, comment = ?, photo_profile = ?, category_id = ?, updated_at = ?
    WHERE id = ?"#;

const SELECT_TESTIMONIAL: &str = r#"
    SELECT id, name, comment, photo_profile, category_id, status, created_at, updated_at
    FROM testimonials"#;

fn row_to_testimonial_sqlite(row: &sqlx::sqlite::SqliteRow) -> Testimonial {
    let status: String = row.get("status");
    Testimonial {
        id: row.get("id"),
        name: row.get("name"),
        comment: row.get("comment"),
        photo_profile: row.get("photo_profile"),
        category_id: row.get("category_id"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_testimonial_mysql(row: &sqlx::mysql::MySqlRow) -> Testimonial {
    let status: String = row.get("status");
    Testimonial {
        id: row.get("id"),
        name: row.get("name"),
        comment: row.get("comment"),
        photo_profile: row.get("photo_profile"),
        category_id: row.get("category_id"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::setup_pool;

    fn input(name: &str) -> CreateTestimonialInput {
        CreateTestimonialInput {
            name: name.to_string(),
            comment: "Very helpful".into(),
            photo_profile: String::new(),
            category_id: 1,
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = setup_pool().await;
        let repo = SqlxTestimonialRepository::new(pool.clone());

        repo.create(&input("A"), ModerationStatus::Pending).await.unwrap();
        let b = repo.create(&input("B"), ModerationStatus::Pending).await.unwrap();
        pool.execute(&format!(
            "UPDATE testimonials SET status = 'approved' WHERE id = {}",
            b.id
        ))
        .await
        .unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        let pending = repo.list(Some(ModerationStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "A");
        let approved = repo.list(Some(ModerationStatus::Approved)).await.unwrap();
        assert_eq!(approved[0].id, b.id);
    }

    #[tokio::test]
    async fn test_guarded_update_and_delete() {
        let pool = setup_pool().await;
        let repo = SqlxTestimonialRepository::new(pool.clone());

        let mut t = repo.create(&input("A"), ModerationStatus::Pending).await.unwrap();
        pool.execute(&format!(
            "UPDATE testimonials SET status = 'approved' WHERE id = {}",
            t.id
        ))
        .await
        .unwrap();

        t.name = "Changed".into();
        assert!(!repo.update(&t, Some(ModerationStatus::Pending)).await.unwrap());
        assert!(!repo.delete(t.id, Some(ModerationStatus::Pending)).await.unwrap());
        assert_eq!(repo.get_by_id(t.id).await.unwrap().unwrap().name, "A");

        assert!(repo.update(&t, None).await.unwrap());
        assert_eq!(repo.get_by_id(t.id).await.unwrap().unwrap().name, "Changed");
        assert!(repo.delete(t.id, None).await.unwrap());
        assert!(repo.get_by_id(t.id).await.unwrap().is_none());
    }
}
