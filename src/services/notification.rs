//! Notification service
//!
//! Records an in-app notification for the uploader and forwards a WhatsApp
//! alert to the admin number whenever new content is uploaded. Uploads never
//! wait on this: `spawn_upload_notice` runs it in the background and only
//! logs failures.

use std::sync::Arc;

use crate::db::repositories::NotificationRepository;
use crate::models::{EntityKind, Identity, Notification};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::notifier::NotificationDispatcher;

pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    admin_address: String,
}

impl NotificationService {
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        admin_address: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            dispatcher,
            admin_address: admin_address.into(),
        }
    }

    /// Persist the notice, then send the alert.
    ///
    /// The row is kept even if the send fails; the send failure is returned
    /// as `DependencyFailure`.
    pub async fn notify_upload(
        &self,
        uploader_id: i64,
        kind: EntityKind,
        title: &str,
    ) -> ServiceResult<Notification> {
        let message = upload_message(kind, title);
        let notification = self
            .repo
            .create(uploader_id, &kind.to_string(), &message)
            .await?;

        self.dispatcher.send(&self.admin_address, &message).await?;

        Ok(notification)
    }

    /// Fire-and-forget variant used by the upload paths
    pub fn spawn_upload_notice(self: &Arc<Self>, uploader_id: i64, kind: EntityKind, title: String) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.notify_upload(uploader_id, kind, &title).await {
                tracing::warn!(%kind, uploader_id, error = %e, "upload notification failed");
            }
        });
    }

    pub async fn list_for(&self, identity: &Identity) -> ServiceResult<Vec<Notification>> {
        Ok(self.repo.list_for_user(identity.user_id).await?)
    }

    /// Mark one of the caller's notifications as read
    pub async fn mark_read(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        if !self.repo.mark_read(id, identity.user_id).await? {
            return Err(ServiceError::not_found("notification", id));
        }
        Ok(())
    }
}

fn upload_message(kind: EntityKind, title: &str) -> String {
    format!("New {} uploaded: {}", kind, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_user, setup_pool};
    use crate::db::repositories::SqlxNotificationRepository;
    use crate::models::{NotificationStatus, UserRole};
    use crate::services::notifier::{LogDispatcher, NotificationError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(&self, to: &str, body: &str) -> Result<(), NotificationError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct DownDispatcher;

    #[async_trait]
    impl NotificationDispatcher for DownDispatcher {
        async fn send(&self, _: &str, _: &str) -> Result<(), NotificationError> {
            Err(NotificationError::SendFailed("503".into()))
        }
    }

    fn identity(user_id: i64) -> Identity {
        Identity {
            user_id,
            name: "staff".into(),
            email: "staff@example.com".into(),
            role: UserRole::Staff,
        }
    }

    #[tokio::test]
    async fn test_notify_upload_records_and_sends() {
        let pool = setup_pool().await;
        let staff = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let service = NotificationService::new(
            SqlxNotificationRepository::boxed(pool),
            dispatcher.clone(),
            "whatsapp:+6285700000000",
        );

        let n = service
            .notify_upload(staff, EntityKind::Article, "Hello")
            .await
            .unwrap();
        assert_eq!(n.kind, "article");
        assert_eq!(n.message, "New article uploaded: Hello");

        let sent = dispatcher.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                "whatsapp:+6285700000000".to_string(),
                "New article uploaded: Hello".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_send_failure_keeps_row() {
        let pool = setup_pool().await;
        let staff = insert_user(&pool, "staff@example.com", UserRole::Staff).await;
        let service = NotificationService::new(
            SqlxNotificationRepository::boxed(pool),
            Arc::new(DownDispatcher),
            "whatsapp:+6285700000000",
        );

        let err = service
            .notify_upload(staff, EntityKind::Video, "Clip")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DependencyFailure(_)));
        assert_eq!(service.list_for(&identity(staff)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() {
        let pool = setup_pool().await;
        let owner = insert_user(&pool, "owner@example.com", UserRole::Staff).await;
        let other = insert_user(&pool, "other@example.com", UserRole::Staff).await;
        let service = NotificationService::new(
            SqlxNotificationRepository::boxed(pool),
            Arc::new(LogDispatcher),
            "",
        );

        let n = service
            .notify_upload(owner, EntityKind::Article, "Mine")
            .await
            .unwrap();

        let err = service.mark_read(&identity(other), n.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        service.mark_read(&identity(owner), n.id).await.unwrap();
        let listed = service.list_for(&identity(owner)).await.unwrap();
        assert_eq!(listed[0].status, NotificationStatus::Read);
        assert!(service.list_for(&identity(other)).await.unwrap().is_empty());
    }
}
