//! Comment service
//!
//! Comments and replies on articles. Every comment, reply included, starts
//! `pending`; approve and reject are separate single-purpose operations.
//! Deletion is authorised against the typed caller identity:
//! - admins delete anything
//! - staff delete their own comments
//! - staff delete end-user comments, never those of staff or admins

use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CommentRepository, UserRepository};
use crate::models::{
    Comment, CreateCommentInput, EntityKind, Identity, ModerationStatus, NewComment,
    ReplyCommentInput,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::require;
use crate::services::workflow::{Transition, WorkflowService};

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    articles: Arc<dyn ArticleRepository>,
    users: Arc<dyn UserRepository>,
    workflow: Arc<WorkflowService>,
}

impl CommentService {
    pub fn new(
        repo: Arc<dyn CommentRepository>,
        articles: Arc<dyn ArticleRepository>,
        users: Arc<dyn UserRepository>,
        workflow: Arc<WorkflowService>,
    ) -> Self {
        Self {
            repo,
            articles,
            users,
            workflow,
        }
    }

    /// Post a comment on an article as `identity`.
    ///
    /// Username and email fall back to the caller's account details.
    pub async fn create(
        &self,
        identity: &Identity,
        input: CreateCommentInput,
    ) -> ServiceResult<Comment> {
        require("comment", &input.comment)?;

        if self.articles.get_by_id(input.article_id).await?.is_none() {
            return Err(ServiceError::not_found("article", input.article_id));
        }
        if let Some(parent_id) = input.parent_id {
            let parent = self.get(parent_id).await?;
            if parent.article_id != input.article_id {
                return Err(ServiceError::invalid(
                    "parent comment belongs to a different article",
                ));
            }
        }

        let comment = self
            .insert(
                identity,
                input.article_id,
                input.parent_id,
                input.username,
                input.email,
                input.comment,
            )
            .await?;
        tracing::info!(comment_id = comment.id, article_id = comment.article_id, "comment created");
        Ok(comment)
    }

    /// Reply to comment `parent_id`.
    ///
    /// The reply inherits the parent's article and starts `pending`
    /// whatever the parent's status is.
    pub async fn reply(
        &self,
        identity: &Identity,
        parent_id: i64,
        input: ReplyCommentInput,
    ) -> ServiceResult<Comment> {
        require("comment", &input.comment)?;
        let parent = self.get(parent_id).await?;

        let reply = self
            .insert(
                identity,
                parent.article_id,
                Some(parent.id),
                input.username,
                input.email,
                input.comment,
            )
            .await?;
        tracing::info!(comment_id = reply.id, parent_id, "reply created");
        Ok(reply)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Comment> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("comment", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Comment>> {
        Ok(self.repo.list().await?)
    }

    pub async fn approve(&self, id: i64) -> ServiceResult<Transition> {
        self.moderate(id, ModerationStatus::Approved).await
    }

    pub async fn reject(&self, id: i64) -> ServiceResult<Transition> {
        self.moderate(id, ModerationStatus::Rejected).await
    }

    /// Unconditional delete (admin)
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("comment", id));
        }
        tracing::info!(comment_id = id, "comment deleted");
        Ok(())
    }

    /// Delete a comment the caller authored
    pub async fn delete_own(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        let comment = self.get(id).await?;
        if comment.author_id != Some(identity.user_id) {
            return Err(ServiceError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }
        self.delete(id).await
    }

    /// Delete a comment written by an end user or an anonymous visitor
    pub async fn delete_user_comment(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        let comment = self.get(id).await?;

        if let Some(author_id) = comment.author_id {
            let author = self.users.get_by_id(author_id).await?;
            if author.is_some_and(|a| a.role.is_staff()) {
                return Err(ServiceError::Forbidden(
                    "Comments by staff or admins cannot be deleted here".to_string(),
                ));
            }
        }

        tracing::info!(comment_id = id, by = identity.user_id, "end-user comment removed");
        self.delete(id).await
    }

    async fn moderate(&self, id: i64, to: ModerationStatus) -> ServiceResult<Transition> {
        Ok(self
            .workflow
            .transition(EntityKind::Comment, id, to.as_str())
            .await?)
    }

    async fn insert(
        &self,
        identity: &Identity,
        article_id: i64,
        parent_id: Option<i64>,
        username: Option<String>,
        email: Option<String>,
        comment: String,
    ) -> ServiceResult<Comment> {
        let status: ModerationStatus =
            WorkflowService::initial_status(EntityKind::Comment).parse()?;

        let new = NewComment {
            article_id,
            author_id: Some(identity.user_id),
            parent_id,
            username: non_blank(username).unwrap_or_else(|| identity.name.clone()),
            email: non_blank(email).unwrap_or_else(|| identity.email.clone()),
            comment: comment.trim().to_string(),
            status,
        };
        Ok(self.repo.create(&new).await?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_article, insert_user, setup_pool};
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCommentRepository, SqlxStatusRepository, SqlxUserRepository,
    };
    use crate::db::DynDatabasePool;
    use crate::models::UserRole;

    struct Fixture {
        service: CommentService,
        pool: DynDatabasePool,
        article_id: i64,
        staff: Identity,
    }

    fn identity(user_id: i64, name: &str, role: UserRole) -> Identity {
        Identity {
            user_id,
            name: name.to_string(),
            email: format!("{}@example.com", name),
            role,
        }
    }

    async fn setup() -> Fixture {
        let pool = setup_pool().await;
        let staff_id = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let article_id = insert_article(&pool, staff_id, "Post").await;
        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxArticleRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            Arc::new(WorkflowService::new(SqlxStatusRepository::boxed(pool.clone()))),
        );
        Fixture {
            service,
            pool,
            article_id,
            staff: identity(staff_id, "staff", UserRole::Staff),
        }
    }

    fn comment(article_id: i64, text: &str) -> CreateCommentInput {
        CreateCommentInput {
            article_id,
            parent_id: None,
            username: None,
            email: None,
            comment: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_identity_and_pending() {
        let f = setup().await;
        let c = f
            .service
            .create(&f.staff, comment(f.article_id, "Nice post"))
            .await
            .unwrap();
        assert_eq!(c.status, ModerationStatus::Pending);
        assert_eq!(c.username, "staff");
        assert_eq!(c.email, "staff@example.com");
        assert_eq!(c.author_id, Some(f.staff.user_id));
    }

    #[tokio::test]
    async fn test_create_on_missing_article_is_not_found() {
        let f = setup().await;
        let err = f
            .service
            .create(&f.staff, comment(999, "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approve_then_reject() {
        let f = setup().await;
        let c = f
            .service
            .create(&f.staff, comment(f.article_id, "Hi"))
            .await
            .unwrap();

        let t = f.service.approve(c.id).await.unwrap();
        assert_eq!((t.from.as_str(), t.to), ("pending", "approved"));
        let t = f.service.reject(c.id).await.unwrap();
        assert_eq!((t.from.as_str(), t.to), ("approved", "rejected"));
        assert_eq!(
            f.service.get(c.id).await.unwrap().status,
            ModerationStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_reply_is_pending_regardless_of_parent() {
        let f = setup().await;
        let parent = f
            .service
            .create(&f.staff, comment(f.article_id, "Question"))
            .await
            .unwrap();
        f.service.approve(parent.id).await.unwrap();

        let reply = f
            .service
            .reply(
                &f.staff,
                parent.id,
                ReplyCommentInput {
                    username: Some("Support".into()),
                    email: None,
                    comment: "Answer".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(reply.parent_id, Some(parent.id));
        assert_eq!(reply.article_id, f.article_id);
        assert_eq!(reply.status, ModerationStatus::Pending);
        assert_eq!(reply.username, "Support");
        assert_eq!(
            f.service.get(parent.id).await.unwrap().status,
            ModerationStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_reply_to_missing_comment_is_not_found() {
        let f = setup().await;
        let err = f
            .service
            .reply(
                &f.staff,
                7,
                ReplyCommentInput {
                    username: None,
                    email: None,
                    comment: "Hello".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_own_requires_authorship() {
        let f = setup().await;
        let other_id = insert_user(&f.pool, "other@example.com", UserRole::Staff).await;
        let other = identity(other_id, "other", UserRole::Staff);

        let c = f
            .service
            .create(&f.staff, comment(f.article_id, "Mine"))
            .await
            .unwrap();

        let err = f.service.delete_own(&other, c.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(f.service.get(c.id).await.is_ok());

        f.service.delete_own(&f.staff, c.id).await.unwrap();
        assert!(matches!(f.service.get(c.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_comment_spares_staff_comments() {
        let f = setup().await;
        let user_id = insert_user(&f.pool, "reader@example.com", UserRole::User).await;
        let reader = identity(user_id, "reader", UserRole::User);

        let by_reader = f
            .service
            .create(&reader, comment(f.article_id, "From a reader"))
            .await
            .unwrap();
        let by_staff = f
            .service
            .create(&f.staff, comment(f.article_id, "From staff"))
            .await
            .unwrap();

        let err = f
            .service
            .delete_user_comment(&f.staff, by_staff.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        f.service
            .delete_user_comment(&f.staff, by_reader.id)
            .await
            .unwrap();
        assert_eq!(f.service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_comment_rejected() {
        let f = setup().await;
        let err = f
            .service
            .create(&f.staff, comment(f.article_id, "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
