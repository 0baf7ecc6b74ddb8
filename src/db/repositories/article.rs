//! Article repository
//!
//! Tags are stored as a JSON array in a TEXT column. Status changes do not go
//! through this repository; see [`super::status`].

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Article, CreateArticleInput, PublicationStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new article with the given slug, author and status
    async fn create(
        &self,
        input: &CreateArticleInput,
        slug: &str,
        author_id: i64,
        status: PublicationStatus,
    ) -> Result<Article>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// All articles, newest first
    async fn list(&self) -> Result<Vec<Article>>;

    /// Persist every editable field of `article` (status excluded)
    async fn update(&self, article: &Article) -> Result<Article>;

    /// Delete by ID; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(
        &self,
        input: &CreateArticleInput,
        slug: &str,
        author_id: i64,
        status: PublicationStatus,
    ) -> Result<Article> {
        let now = Utc::now();
        let article = Article {
            id: 0,
            category_id: input.category_id,
            title: input.title.clone(),
            slug: slug.to_string(),
            tags: input.tags.clone(),
            content: input.content.clone(),
            message: input.message.clone(),
            thumbnail: input.thumbnail.clone(),
            alt_thumbnail: input.alt_thumbnail.clone(),
            banner: input.banner.clone(),
            alt_banner: input.alt_banner.clone(),
            poster: input.poster.clone(),
            alt_poster: input.alt_poster.clone(),
            link_video: input.link_video.clone(),
            status,
            meta_title: input.meta_title.clone(),
            meta_description: input.meta_description.clone(),
            author_id,
            created_at: now,
            updated_at: now,
        };

        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => insert_article_sqlite(sqlite(&self.pool)?, &article).await?,
            DatabaseDriver::Mysql => insert_article_mysql(mysql(&self.pool)?, &article).await?,
        };

        Ok(Article { id, ..article })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let sql = format!("{SELECT_ARTICLE} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get article by ID")?;
                row.as_ref().map(row_to_article_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get article by ID")?;
                row.as_ref().map(row_to_article_mysql).transpose()
            }
        }
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let sql = format!("{SELECT_ARTICLE} ORDER BY created_at DESC, id DESC");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list articles")?;
                rows.iter().map(row_to_article_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list articles")?;
                rows.iter().map(row_to_article_mysql).collect()
            }
        }
    }

    async fn update(&self, article: &Article) -> Result<Article> {
        let now = Utc::now();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_article_sqlite(sqlite(&self.pool)?, article, now).await?
            }
            DatabaseDriver::Mysql => update_article_mysql(mysql(&self.pool)?, article, now).await?,
        }

        Ok(Article {
            updated_at: now,
            ..article.clone()
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM articles WHERE id = ?")
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM articles WHERE id = ?")
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete article")?;

        Ok(affected > 0)
    }
}

const INSERT_ARTICLE: &str = r#"
    INSERT INTO articles (
        category_id, title, slug, tags, content, message,
        thumbnail, alt_thumbnail, banner, alt_banner, poster, alt_poster,
        link_video, status, meta_title, meta_description, author_id,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_ARTICLE: &str = r#"
    UPDATE articles SET
        category_id = ?, title = ?, slug = ?, tags = ?, content = ?, message = ?,
        thumbnail = ?, alt_thumbnail = ?, banner = ?, alt_banner = ?,
        poster = ?, alt_poster = ?, link_video = ?,
        meta_title = ?, meta_description = ?, updated_at = ?
    WHERE id = ?
"#;

const SELECT_ARTICLE: &str = r#"
    SELECT id, category_id, title, slug, tags, content, message,
           thumbnail, alt_thumbnail, banner, alt_banner, poster, alt_poster,
           link_video, status, meta_title, meta_description, author_id,
           created_at, updated_at
    FROM articles
"#;

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).context("Failed to encode article tags")
}

fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<i64> {
    let result = sqlx::query(INSERT_ARTICLE)
        .bind(article.category_id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(encode_tags(&article.tags)?)
        .bind(&article.content)
        .bind(&article.message)
        .bind(&article.thumbnail)
        .bind(&article.alt_thumbnail)
        .bind(&article.banner)
        .bind(&article.alt_banner)
        .bind(&article.poster)
        .bind(&article.alt_poster)
        .bind(&article.link_video)
        .bind(article.status.as_str())
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(article.author_id)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(pool)
        .await
        .context("Failed to create article")?;

    Ok(result.last_insert_rowid())
}

async fn update_article_sqlite(
    pool: &SqlitePool,
    article: &Article,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    sqlx::query(UPDATE_ARTICLE)
        .bind(article.category_id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(encode_tags(&article.tags)?)
        .bind(&article.content)
        .bind(&article.message)
        .bind(&article.thumbnail)
        .bind(&article.alt_thumbnail)
        .bind(&article.banner)
        .bind(&article.alt_banner)
        .bind(&article.poster)
        .bind(&article.alt_poster)
        .bind(&article.link_video)
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(now)
        .bind(article.id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    Ok(())
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let tags: String = row.get("tags");
    let status: String = row.get("status");

    Ok(Article {
        id: row.get("id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        tags: decode_tags(&tags),
        content: row.get("content"),
        message: row.get("message"),
        thumbnail: row.get("thumbnail"),
        alt_thumbnail: row.get("alt_thumbnail"),
        banner: row.get("banner"),
        alt_banner: row.get("alt_banner"),
        poster: row.get("poster"),
        alt_poster: row.get("alt_poster"),
        link_video: row.get("link_video"),
        status: status.parse().unwrap_or_default(),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn insert_article_mysql(pool: &MySqlPool, article: &Article) -> Result<i64> {
    let result = sqlx::query(INSERT_ARTICLE)
        .bind(article.category_id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(encode_tags(&article.tags)?)
        .bind(&article.content)
        .bind(&article.message)
        .bind(&article.thumbnail)
        .bind(&article.alt_thumbnail)
        .bind(&article.banner)
        .bind(&article.alt_banner)
        .bind(&article.poster)
        .bind(&article.alt_poster)
        .bind(&article.link_video)
        .bind(article.status.as_str())
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(article.author_id)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(pool)
        .await
        .context("Failed to create article")?;

    Ok(result.last_insert_id() as i64)
}

async fn update_article_mysql(
    pool: &MySqlPool,
    article: &Article,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    sqlx::query(UPDATE_ARTICLE)
        .bind(article.category_id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(encode_tags(&article.tags)?)
        .bind(&article.content)
        .bind(&article.message)
        .bind(&article.thumbnail)
        .bind(&article.alt_thumbnail)
        .bind(&article.banner)
        .bind(&article.alt_banner)
        .bind(&article.poster)
        .bind(&article.alt_poster)
        .bind(&article.link_video)
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(now)
        .bind(article.id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    Ok(())
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    let tags: String = row.get("tags");
    let status: String = row.get("status");

    Ok(Article {
        id: row.get("id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        tags: decode_tags(&tags),
        content: row.get("content"),
        message: row.get("message"),
        thumbnail: row.get("thumbnail"),
        alt_thumbnail: row.get("alt_thumbnail"),
        banner: row.get("banner"),
        alt_banner: row.get("alt_banner"),
        poster: row.get("poster"),
        alt_poster: row.get("alt_poster"),
        link_video: row.get("link_video"),
        status: status.parse().unwrap_or_default(),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::models::UserRole;

    fn sample_input(title: &str) -> CreateArticleInput {
        CreateArticleInput {
            category_id: 1,
            title: title.to_string(),
            tags: vec!["health".into(), "tips".into()],
            content: "Body".into(),
            link_video: "https://youtu.be/abc".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_article() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let repo = SqlxArticleRepository::new(pool);

        let created = repo
            .create(
                &sample_input("First"),
                "first",
                author,
                PublicationStatus::PendingApproval,
            )
            .await
            .expect("Failed to create article");
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.tags, vec!["health".to_string(), "tips".to_string()]);
        assert_eq!(fetched.status, PublicationStatus::PendingApproval);
        assert_eq!(fetched.author_id, author);
    }

    #[tokio::test]
    async fn test_update_keeps_status() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let repo = SqlxArticleRepository::new(pool);

        let mut article = repo
            .create(&sample_input("Old"), "old", author, PublicationStatus::PendingApproval)
            .await
            .unwrap();
        article.title = "New".into();
        article.tags = vec![];
        article.status = PublicationStatus::Approval;
        repo.update(&article).await.unwrap();

        let fetched = repo.get_by_id(article.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New");
        assert!(fetched.tags.is_empty());
        assert_eq!(fetched.status, PublicationStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let repo = SqlxArticleRepository::new(pool);

        let a = repo
            .create(&sample_input("A"), "a", author, PublicationStatus::PendingApproval)
            .await
            .unwrap();
        repo.create(&sample_input("B"), "b", author, PublicationStatus::PendingApproval)
            .await
            .unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let repo = SqlxArticleRepository::new(pool);

        let input = CreateArticleInput {
            category_id: 42,
            ..sample_input("Orphan")
        };
        let result = repo
            .create(&input, "orphan", author, PublicationStatus::PendingApproval)
            .await;
        assert!(result.is_err());
    }
}
