//! Webinar service

use std::sync::Arc;

use crate::db::repositories::{UserRepository, WebinarRepository};
use crate::models::{CreateWebinarInput, Webinar};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{optional_url, require};

pub struct WebinarService {
    repo: Arc<dyn WebinarRepository>,
    users: Arc<dyn UserRepository>,
}

impl WebinarService {
    pub fn new(repo: Arc<dyn WebinarRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { repo, users }
    }

    /// Schedule a webinar hosted by an existing staff member or admin
    pub async fn create(&self, input: CreateWebinarInput) -> ServiceResult<Webinar> {
        require("title", &input.title)?;
        require("description", &input.description)?;
        optional_url("link_meet", &input.link_meet)?;
        if input.host_id <= 0 {
            return Err(ServiceError::invalid("host_id is required"));
        }

        let host = self.users.get_by_id(input.host_id).await?;
        if !host.is_some_and(|h| h.role.is_staff()) {
            return Err(ServiceError::not_found("staff member", input.host_id));
        }

        let webinar = self.repo.create(&input).await?;
        tracing::info!(webinar_id = webinar.id, host_id = webinar.host_id, "webinar created");
        Ok(webinar)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Webinar> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("webinar", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Webinar>> {
        Ok(self.repo.list().await?)
    }
}
