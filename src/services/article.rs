//! Article service
//!
//! Business logic for articles:
//! - Create (always `pending approval`), read, update, delete
//! - Slug generation from the title
//! - Publication status transitions through the workflow engine
//! - Upload notification, decoupled from the create write

use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CategoryRepository};
use crate::models::{
    slugify, Article, CreateArticleInput, EntityKind, Identity, PublicationStatus,
    UpdateArticleInput,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::notification::NotificationService;
use crate::services::validate::{optional_url, require};
use crate::services::workflow::{Transition, WorkflowService};

pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
    workflow: Arc<WorkflowService>,
    notifications: Arc<NotificationService>,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        workflow: Arc<WorkflowService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            repo,
            categories,
            workflow,
            notifications,
        }
    }

    /// Create an article authored by `identity`.
    ///
    /// The article starts in the initial publication status whatever the
    /// caller sent. Once the row is committed an upload notice is queued in
    /// the background; its failure never fails the create.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if title or content is blank, the category does not
    ///   exist, or `link_video` is not a URL
    pub async fn create(
        &self,
        identity: &Identity,
        input: CreateArticleInput,
    ) -> ServiceResult<Article> {
        self.validate(&input.title, &input.content, input.category_id, &input.link_video)
            .await?;

        let status: PublicationStatus =
            WorkflowService::initial_status(EntityKind::Article).parse()?;
        let slug = article_slug(&input.title);

        let article = self
            .repo
            .create(&input, &slug, identity.user_id, status)
            .await?;
        tracing::info!(article_id = article.id, author_id = identity.user_id, "article created");

        self.notifications.spawn_upload_notice(
            identity.user_id,
            EntityKind::Article,
            article.title.clone(),
        );

        Ok(article)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Article> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("article", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Article>> {
        Ok(self.repo.list().await?)
    }

    /// Apply a partial update. Status is not editable here.
    pub async fn update(&self, id: i64, input: UpdateArticleInput) -> ServiceResult<Article> {
        let mut article = self.get(id).await?;
        let title_changed = input.title.is_some();
        input.apply_to(&mut article);

        self.validate(
            &article.title,
            &article.content,
            article.category_id,
            &article.link_video,
        )
        .await?;
        if title_changed {
            article.slug = article_slug(&article.title);
        }

        Ok(self.repo.update(&article).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("article", id));
        }
        tracing::info!(article_id = id, "article deleted");
        Ok(())
    }

    /// Move the article to another publication status
    pub async fn set_status(&self, id: i64, status: &str) -> ServiceResult<Transition> {
        Ok(self
            .workflow
            .transition(EntityKind::Article, id, status)
            .await?)
    }

    async fn validate(
        &self,
        title: &str,
        content: &str,
        category_id: i64,
        link_video: &str,
    ) -> ServiceResult<()> {
        require("title", title)?;
        require("content", content)?;
        optional_url("link_video", link_video)?;

        if self.categories.get_by_id(category_id).await?.is_none() {
            return Err(ServiceError::invalid(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }
}

/// Slug from the title, never empty
fn article_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::db::repositories::{
        NotificationRepository, SqlxArticleRepository, SqlxCategoryRepository,
        SqlxNotificationRepository, SqlxStatusRepository,
    };
    use crate::db::DynDatabasePool;
    use crate::models::UserRole;
    use crate::services::notifier::{LogDispatcher, NotificationDispatcher, NotificationError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct DownDispatcher;

    #[async_trait]
    impl NotificationDispatcher for DownDispatcher {
        async fn send(&self, _: &str, _: &str) -> Result<(), NotificationError> {
            Err(NotificationError::SendFailed("twilio unavailable".into()))
        }
    }

    fn build(pool: &DynDatabasePool, dispatcher: Arc<dyn NotificationDispatcher>) -> ArticleService {
        let notifications = Arc::new(NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            dispatcher,
            "whatsapp:+6285700000000",
        ));
        ArticleService::new(
            SqlxArticleRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool.clone()),
            Arc::new(WorkflowService::new(SqlxStatusRepository::boxed(pool.clone()))),
            notifications,
        )
    }

    async fn setup_test_service() -> (DynDatabasePool, ArticleService, Identity) {
        let pool = setup_pool().await;
        let id = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let identity = Identity {
            user_id: id,
            name: "staff".into(),
            email: "staff@example.com".into(),
            role: UserRole::Staff,
        };
        let service = build(&pool, Arc::new(LogDispatcher));
        (pool, service, identity)
    }

    fn input(title: &str, content: &str) -> CreateArticleInput {
        CreateArticleInput {
            category_id: 1,
            title: title.to_string(),
            content: content.to_string(),
            tags: vec!["health".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_article_starts_pending_approval() {
        let (_pool, service, identity) = setup_test_service().await;
        let article = service
            .create(&identity, input("Sleep Well", "Tips"))
            .await
            .unwrap();

        assert_eq!(article.status, PublicationStatus::PendingApproval);
        assert_eq!(article.slug, "sleep-well");
        assert_eq!(article.author_id, identity.user_id);
        assert_eq!(article.tags, vec!["health".to_string()]);
    }

    #[tokio::test]
    async fn test_create_article_validation() {
        let (_pool, service, identity) = setup_test_service().await;

        for (title, content) in [("", "body"), ("   ", "body"), ("Title", "")] {
            let err = service
                .create(&identity, input(title, content))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }

        let mut bad_category = input("Title", "Body");
        bad_category.category_id = 42;
        assert!(matches!(
            service.create(&identity, bad_category).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let mut bad_link = input("Title", "Body");
        bad_link.link_video = "not a url".into();
        assert!(matches!(
            service.create(&identity, bad_link).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_create_succeeds_when_dispatcher_fails() {
        let pool = setup_pool().await;
        let author = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let identity = Identity {
            user_id: author,
            name: "staff".into(),
            email: "staff@example.com".into(),
            role: UserRole::Staff,
        };
        let service = build(&pool, Arc::new(DownDispatcher));

        let article = service
            .create(&identity, input("Resilient", "Body"))
            .await
            .unwrap();
        assert_eq!(service.get(article.id).await.unwrap().title, "Resilient");
    }

    #[tokio::test]
    async fn test_create_records_upload_notification() {
        let (pool, service, identity) = setup_test_service().await;
        service
            .create(&identity, input("Noticed", "Body"))
            .await
            .unwrap();

        let notifications = SqlxNotificationRepository::new(pool);
        let mut found = Vec::new();
        for _ in 0..50 {
            found = notifications.list_for_user(identity.user_id).await.unwrap();
            if !found.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, "article");
    }

    #[tokio::test]
    async fn test_update_keeps_status_and_reslugs() {
        let (_pool, service, identity) = setup_test_service().await;
        let article = service
            .create(&identity, input("Old Title", "Body"))
            .await
            .unwrap();
        service.set_status(article.id, "approval").await.unwrap();

        let updated = service
            .update(
                article.id,
                UpdateArticleInput {
                    title: Some("New Title".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "new-title");

        let fetched = service.get(article.id).await.unwrap();
        assert_eq!(fetched.title, "New Title");
        assert_eq!(fetched.status, PublicationStatus::Approval);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let (_pool, service, identity) = setup_test_service().await;
        let article = service
            .create(&identity, input("Title", "Body"))
            .await
            .unwrap();

        let err = service
            .update(
                article.id,
                UpdateArticleInput {
                    title: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(service.get(article.id).await.unwrap().title, "Title");
    }

    #[tokio::test]
    async fn test_set_status_validates_domain() {
        let (_pool, service, identity) = setup_test_service().await;
        let article = service
            .create(&identity, input("Title", "Body"))
            .await
            .unwrap();

        let err = service.set_status(article.id, "approved").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus(_)));

        let t = service.set_status(article.id, "rejected").await.unwrap();
        assert_eq!(t.from, "pending approval");
        assert_eq!(t.to, "rejected");

        let missing = service.set_status(999, "approval").await.unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_article() {
        let (_pool, service, identity) = setup_test_service().await;
        let article = service
            .create(&identity, input("Gone", "Body"))
            .await
            .unwrap();

        service.delete(article.id).await.unwrap();
        assert!(matches!(service.get(article.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(article.id).await, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_article_slug_never_empty() {
        assert_eq!(article_slug("Hello, World!"), "hello-world");
        assert_eq!(article_slug("???"), "article");
    }
}
