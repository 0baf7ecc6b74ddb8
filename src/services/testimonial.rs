//! Testimonial service
//!
//! Admins manage every testimonial. Staff only see and edit rows still
//! `pending`; the pending check is part of the UPDATE/DELETE statement, so a
//! row approved in between is left alone and reported as not found.

use std::sync::Arc;

use crate::db::repositories::TestimonialRepository;
use crate::models::{
    validate_status, CreateTestimonialInput, EntityKind, ModerationStatus, Testimonial,
    UpdateTestimonialInput,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::require;
use crate::services::workflow::{Transition, WorkflowService};

pub struct TestimonialService {
    repo: Arc<dyn TestimonialRepository>,
    workflow: Arc<WorkflowService>,
}

impl TestimonialService {
    pub fn new(repo: Arc<dyn TestimonialRepository>, workflow: Arc<WorkflowService>) -> Self {
        Self { repo, workflow }
    }

    pub async fn create(&self, input: CreateTestimonialInput) -> ServiceResult<Testimonial> {
        require("name", &input.name)?;
        require("comment", &input.comment)?;

        let status: ModerationStatus =
            WorkflowService::initial_status(EntityKind::Testimonial).parse()?;
        let testimonial = self.repo.create(&input, status).await?;
        tracing::info!(testimonial_id = testimonial.id, "testimonial created");
        Ok(testimonial)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Testimonial> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("testimonial", id))
    }

    /// List testimonials, optionally filtered by a status string
    pub async fn list(&self, status: Option<&str>) -> ServiceResult<Vec<Testimonial>> {
        let filter: Option<ModerationStatus> = match status {
            Some(s) => Some(validate_status(EntityKind::Testimonial, s)?.parse()?),
            None => None,
        };
        Ok(self.repo.list(filter).await?)
    }

    pub async fn list_pending(&self) -> ServiceResult<Vec<Testimonial>> {
        Ok(self.repo.list(Some(ModerationStatus::Pending)).await?)
    }

    pub async fn update(&self, id: i64, input: UpdateTestimonialInput) -> ServiceResult<Testimonial> {
        self.update_guarded(id, input, None).await
    }

    /// Update a testimonial that is still pending
    pub async fn update_pending(
        &self,
        id: i64,
        input: UpdateTestimonialInput,
    ) -> ServiceResult<Testimonial> {
        self.update_guarded(id, input, Some(ModerationStatus::Pending))
            .await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.delete_guarded(id, None).await
    }

    /// Delete a testimonial that is still pending
    pub async fn delete_pending(&self, id: i64) -> ServiceResult<()> {
        self.delete_guarded(id, Some(ModerationStatus::Pending)).await
    }

    pub async fn approve(&self, id: i64) -> ServiceResult<Transition> {
        Ok(self
            .workflow
            .transition(EntityKind::Testimonial, id, ModerationStatus::Approved.as_str())
            .await?)
    }

    pub async fn reject(&self, id: i64) -> ServiceResult<Transition> {
        Ok(self
            .workflow
            .transition(EntityKind::Testimonial, id, ModerationStatus::Rejected.as_str())
            .await?)
    }

    async fn update_guarded(
        &self,
        id: i64,
        input: UpdateTestimonialInput,
        guard: Option<ModerationStatus>,
    ) -> ServiceResult<Testimonial> {
        let mut testimonial = self.get(id).await?;
        if guard.is_some_and(|g| g != testimonial.status) {
            return Err(pending_not_found(id));
        }

        input.apply_to(&mut testimonial);
        require("name", &testimonial.name)?;
        require("comment", &testimonial.comment)?;

        if !self.repo.update(&testimonial, guard).await? {
            return Err(pending_not_found(id));
        }
        self.get(id).await
    }

    async fn delete_guarded(&self, id: i64, guard: Option<ModerationStatus>) -> ServiceResult<()> {
        if !self.repo.delete(id, guard).await? {
            return Err(match guard {
                Some(_) => pending_not_found(id),
                None => ServiceError::not_found("testimonial", id),
            });
        }
        tracing::info!(testimonial_id = id, "testimonial deleted");
        Ok(())
    }
}

fn pending_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("pending testimonial {} not found", id))
}
