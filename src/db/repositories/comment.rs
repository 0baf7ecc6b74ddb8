//! Comment repository
//!
//! Comment moderation status is changed through [`super::status`]; this
//! repository only creates, reads and deletes.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Comment, NewComment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &NewComment) -> Result<Comment>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// All comments, oldest first
    async fn list(&self) -> Result<Vec<Comment>>;

    /// Delete by ID; replies are removed with their parent
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &NewComment) -> Result<Comment> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_COMMENT)
                .bind(comment.article_id)
                .bind(comment.author_id)
                .bind(comment.parent_id)
                .bind(&comment.username)
                .bind(&comment.email)
                .bind(&comment.comment)
                .bind(comment.status.as_str())
                .bind(now)
                .bind(now)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_COMMENT)
                .bind(comment.article_id)
                .bind(comment.author_id)
                .bind(comment.parent_id)
                .bind(&comment.username)
                .bind(&comment.email)
                .bind(&comment.comment)
                .bind(comment.status.as_str())
                .bind(now)
                .bind(now)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create comment")?;

        Ok(Comment {
            id,
            article_id: comment.article_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            username: comment.username.clone(),
            email: comment.email.clone(),
            comment: comment.comment.clone(),
            status: comment.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let sql = format!("{SELECT_COMMENT} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID")?;
                Ok(row.as_ref().map(row_to_comment_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID")?;
                Ok(row.as_ref().map(row_to_comment_mysql))
            }
        }
    }

    async fn list(&self) -> Result<Vec<Comment>> {
        let sql = format!("{SELECT_COMMENT} ORDER BY created_at ASC, id ASC");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list comments")?;
                Ok(rows.iter().map(row_to_comment_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list comments")?;
                Ok(rows.iter().map(row_to_comment_mysql).collect())
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete comment")?;

        Ok(affected > 0)
    }
}

const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (article_id, author_id, parent_id, username, email, comment, status, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_COMMENT: &str = r#"
    SELECT id, article_id, author_id, parent_id, username, email, comment, status, created_at, updated_at
    FROM comments
"#;

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    let status: String = row.get("status");
    Comment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        author_id: row.get("author_id"),
        parent_id: row.get("parent_id"),
        username: row.get("username"),
        email: row.get("email"),
        comment: row.get("comment"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    let status: String = row.get("status");
    Comment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        author_id: row.get("author_id"),
        parent_id: row.get("parent_id"),
        username: row.get("username"),
        email: row.get("email"),
        comment: row.get("comment"),
        status: status.parse().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_article, insert_user, setup_pool};
    use crate::models::{ModerationStatus, UserRole};

    fn new_comment(article_id: i64, parent_id: Option<i64>) -> NewComment {
        NewComment {
            article_id,
            author_id: None,
            parent_id,
            username: "visitor".into(),
            email: "visitor@example.com".into(),
            comment: "Nice read".into(),
            status: ModerationStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_comment() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let article = insert_article(&pool, author, "Post").await;
        let repo = SqlxCommentRepository::new(pool);

        let created = repo.create(&new_comment(article, None)).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.article_id, article);
        assert_eq!(fetched.status, ModerationStatus::Pending);
        assert!(fetched.author_id.is_none());
        assert!(fetched.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_deleting_parent_removes_replies() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let article = insert_article(&pool, author, "Post").await;
        let repo = SqlxCommentRepository::new(pool);

        let parent = repo.create(&new_comment(article, None)).await.unwrap();
        let reply = repo
            .create(&new_comment(article, Some(parent.id)))
            .await
            .unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);

        assert!(repo.delete(parent.id).await.unwrap());
        assert!(repo.get_by_id(reply.id).await.unwrap().is_none());
        assert!(!repo.delete(parent.id).await.unwrap());
    }
}
