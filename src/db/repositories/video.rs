//! Video repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{CreateVideoInput, PublicationStatus, Video};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(
        &self,
        input: &CreateVideoInput,
        author_id: i64,
        status: PublicationStatus,
    ) -> Result<Video>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Video>>;

    /// All videos, newest first
    async fn list(&self) -> Result<Vec<Video>>;

    /// Persist every editable field of `video` (status excluded)
    async fn update(&self, video: &Video) -> Result<Video>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxVideoRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn VideoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(
        &self,
        input: &CreateVideoInput,
        author_id: i64,
        status: PublicationStatus,
    ) -> Result<Video> {
        let now = Utc::now();
        let video = Video {
            id: 0,
            title: input.title.clone(),
            description: input.description.clone(),
            link_video: input.link_video.clone(),
            category_id: input.category_id,
            status,
            author_id,
            meta_title: input.meta_title.clone(),
            meta_description: input.meta_description.clone(),
            created_at: now,
            updated_at: now,
        };

        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => insert_video_sqlite(sqlite(&self.pool)?, &video).await?,
            DatabaseDriver::Mysql => insert_video_mysql(mysql(&self.pool)?, &video).await?,
        };

        Ok(Video { id, ..video })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Video>> {
        let sql = format!("{SELECT_VIDEO} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get video by ID")?;
                Ok(row.as_ref().map(row_to_video_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get video by ID")?;
                Ok(row.as_ref().map(row_to_video_mysql))
            }
        }
    }

    async fn list(&self) -> Result<Vec<Video>> {
        let sql = format!("{SELECT_VIDEO} ORDER BY created_at DESC, id DESC");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list videos")?;
                Ok(rows.iter().map(row_to_video_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list videos")?;
                Ok(rows.iter().map(row_to_video_mysql).collect())
            }
        }
    }

    async fn update(&self, video: &Video) -> Result<Video> {
        let now = Utc::now();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_video_sqlite(sqlite(&self.pool)?, video, now).await?,
            DatabaseDriver::Mysql => update_video_mysql(mysql(&self.pool)?, video, now).await?,
        }

        Ok(Video {
            updated_at: now,
            ..video.clone()
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM videos WHERE id = ?")
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM videos WHERE id = ?")
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete video")?;

        Ok(affected > 0)
    }
}

const INSERT_VIDEO: &str = r#"
    INSERT INTO videos (
        title, description, link_video, category_id, status, author_id,
        meta_title, meta_description, created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_VIDEO: &str = r#"
    UPDATE videos SET
        title = ?, description = ?, link_video = ?, category_id = ?,
        meta_title = ?, meta_description = ?, updated_at = ?
    WHERE id = ?
"#;

const SELECT_VIDEO: &str = r#"
    SELECT id, title, description, link_video, category_id, status, author_id,
           meta_title, meta_description, created_at, updated_at
    FROM videos
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_video_sqlite(pool: &SqlitePool, video: &Video) -> Result<i64> {
    let result = sqlx::query(INSERT_VIDEO)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.link_video)
        .bind(video.category_id)
        .bind(video.status.as_str())
        .bind(video.author_id)
        .bind(&video.meta_title)
        .bind(&video.meta_description)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(pool)
        .await
        .context("Failed to create video")?;

    Ok(result.last_insert_rowid())
}

async fn update_video_sqlite(pool: &SqlitePool, video: &Video, now: DateTime<Utc>) -> Result<()> {
    sqlx::query(UPDATE_VIDEO)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.link_video)
        .bind(video.category_id)
        .bind(&video.meta_title)
        .bind(&video.meta_description)
        .bind(now)
        .bind(video.id)
        .execute(pool)
        .await
        .context("Failed to update video")?;

    Ok(())
}

fn row_to_video_sqlite(row: &sqlx::sqlite::SqliteRow) -> Video {
    let status: String = row.get("status");
    Video {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        link_video: row.get("link_video"),
        category_id: row.get("category_id"),
        status: status.parse().unwrap_or_default(),
        author_id: row.get("author_id"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn insert_video_mysql(pool: &MySqlPool, video: &Video) -> Result<i64> {
    let result = sqlx::query(INSERT_VIDEO)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.link_video)
        .bind(video.category_id)
        .bind(video.status.as_str())
        .bind(video.author_id)
        .bind(&video.meta_title)
        .bind(&video.meta_description)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(pool)
        .await
        .context("Failed to create video")?;

    Ok(result.last_insert_id() as i64)
}

async fn update_video_mysql(pool: &MySqlPool, video: &Video, now: DateTime<Utc>) -> Result<()> {
    sqlx::query(UPDATE_VIDEO)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.link_video)
        .bind(video.category_id)
        .bind(&video.meta_title)
        .bind(&video.meta_description)
        .bind(now)
        .bind(video.id)
        .execute(pool)
        .await
        .context("Failed to update video")?;

    Ok(())
}

fn row_to_video_mysql(row: &sqlx::mysql::MySqlRow) -> Video {
    let status: String = row.get("status");
    Video {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        link_video: row.get("link_video"),
        category_id: row.get("category_id"),
        status: status.parse().unwrap_or_default(),
        author_id: row.get("author_id"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::models::UserRole;

    fn sample_input() -> CreateVideoInput {
        CreateVideoInput {
            title: "Intro".into(),
            description: "A short intro".into(),
            link_video: "https://youtu.be/xyz".into(),
            category_id: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete_video() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let repo = SqlxVideoRepository::new(pool);

        let mut video = repo
            .create(&sample_input(), author, PublicationStatus::PendingApproval)
            .await
            .expect("Failed to create video");
        assert!(video.id > 0);

        video.description = "Updated".into();
        repo.update(&video).await.unwrap();

        let fetched = repo.get_by_id(video.id).await.unwrap().unwrap();
        assert_eq!(fetched.description, "Updated");
        assert_eq!(fetched.status, PublicationStatus::PendingApproval);
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete(video.id).await.unwrap());
        assert!(repo.get_by_id(video.id).await.unwrap().is_none());
    }
}
