//! Video service
//!
//! Same lifecycle as articles: created `pending approval`, moved through the
//! publication domain by an admin, upload notice sent in the background.

use std::sync::Arc;

use crate::db::repositories::{CategoryRepository, VideoRepository};
use crate::models::{
    CreateVideoInput, EntityKind, Identity, PublicationStatus, UpdateVideoInput, Video,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::notification::NotificationService;
use crate::services::validate::{require, require_url};
use crate::services::workflow::{Transition, WorkflowService};

pub struct VideoService {
    repo: Arc<dyn VideoRepository>,
    categories: Arc<dyn CategoryRepository>,
    workflow: Arc<WorkflowService>,
    notifications: Arc<NotificationService>,
}

impl VideoService {
    pub fn new(
        repo: Arc<dyn VideoRepository>,
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

    /// Create a video uploaded by `identity`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if title or link is missing, the link is not a URL,
    ///   or the category is unset or unknown
    pub async fn create(&self, identity: &Identity, input: CreateVideoInput) -> ServiceResult<Video> {
        self.validate(&input.title, &input.link_video, input.category_id)
            .await?;

        let status: PublicationStatus =
            WorkflowService::initial_status(EntityKind::Video).parse()?;
        let video = self.repo.create(&input, identity.user_id, status).await?;
        tracing::info!(video_id = video.id, author_id = identity.user_id, "video created");

        self.notifications.spawn_upload_notice(
            identity.user_id,
            EntityKind::Video,
            video.title.clone(),
        );

        Ok(video)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Video> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("video", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Video>> {
        Ok(self.repo.list().await?)
    }

    pub async fn update(&self, id: i64, input: UpdateVideoInput) -> ServiceResult<Video> {
        let mut video = self.get(id).await?;
        input.apply_to(&mut video);
        self.validate(&video.title, &video.link_video, video.category_id)
            .await?;
        Ok(self.repo.update(&video).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("video", id));
        }
        tracing::info!(video_id = id, "video deleted");
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: &str) -> ServiceResult<Transition> {
        Ok(self.workflow.transition(EntityKind::Video, id, status).await?)
    }

    async fn validate(&self, title: &str, link_video: &str, category_id: i64) -> ServiceResult<()> {
        require("title", title)?;
        require_url("link_video", link_video)?;
        if category_id == 0 {
            return Err(ServiceError::invalid("category_id is required"));
        }
        if self.categories.get_by_id(category_id).await?.is_none() {
            return Err(ServiceError::invalid(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxNotificationRepository, SqlxStatusRepository,
        SqlxVideoRepository,
    };
    use crate::models::UserRole;
    use crate::services::notifier::LogDispatcher;

    async fn setup_test_service() -> (VideoService, Identity) {
        let pool = setup_pool().await;
        let id = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let notifications = Arc::new(NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            Arc::new(LogDispatcher),
            "",
        ));
        let service = VideoService::new(
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool.clone()),
            Arc::new(WorkflowService::new(SqlxStatusRepository::boxed(pool))),
            notifications,
        );
        let identity = Identity {
            user_id: id,
            name: "staff".into(),
            email: "staff@example.com".into(),
            role: UserRole::Staff,
        };
        (service, identity)
    }

    fn input(title: &str, link: &str, category_id: i64) -> CreateVideoInput {
        CreateVideoInput {
            title: title.into(),
            description: "A clip".into(),
            link_video: link.into(),
            category_id,
            meta_title: String::new(),
            meta_description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_video_starts_pending_approval() {
        let (service, identity) = setup_test_service().await;
        let video = service
            .create(&identity, input("Breathing", "https://youtu.be/x", 1))
            .await
            .unwrap();
        assert_eq!(video.status, PublicationStatus::PendingApproval);
        assert_eq!(video.author_id, identity.user_id);
    }

    #[tokio::test]
    async fn test_create_video_validation() {
        let (service, identity) = setup_test_service().await;

        let cases = [
            input("", "https://youtu.be/x", 1),
            input("T", "", 1),
            input("T", "youtu.be/x", 1),
            input("T", "https://youtu.be/x", 0),
            input("T", "https://youtu.be/x", 77),
        ];
        for case in cases {
            let err = service.create(&identity, case).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_video_status_and_delete() {
        let (service, identity) = setup_test_service().await;
        let video = service
            .create(&identity, input("Clip", "https://youtu.be/x", 1))
            .await
            .unwrap();

        service.set_status(video.id, "approval").await.unwrap();
        assert_eq!(
            service.get(video.id).await.unwrap().status,
            PublicationStatus::Approval
        );

        let updated = service
            .update(
                video.id,
                UpdateVideoInput {
                    description: Some("Edited".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Edited");
        assert_eq!(updated.status, PublicationStatus::Approval);

        service.delete(video.id).await.unwrap();
        assert!(matches!(service.get(video.id).await, Err(ServiceError::NotFound(_))));
    }
}
