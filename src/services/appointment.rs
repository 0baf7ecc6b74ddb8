//! Appointment service
//!
//! Bookings start `pending`. Host assignment and status transitions are
//! separate operations: assigning a host never touches the status.

use std::sync::Arc;

use crate::db::repositories::{AppointmentRepository, UserRepository};
use crate::models::{
    validate_status, Appointment, AppointmentStatus, CreateAppointmentInput, EntityKind,
    NewAppointment,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::optional_url;
use crate::services::workflow::{Transition, WorkflowService};

pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
    users: Arc<dyn UserRepository>,
    workflow: Arc<WorkflowService>,
}

impl AppointmentService {
    pub fn new(
        repo: Arc<dyn AppointmentRepository>,
        users: Arc<dyn UserRepository>,
        workflow: Arc<WorkflowService>,
    ) -> Self {
        Self {
            repo,
            users,
            workflow,
        }
    }

    /// Create an appointment on behalf of a customer (admin/staff).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` ("all fields are required") when name, email, date or
    ///   time is missing
    pub async fn create(&self, input: CreateAppointmentInput) -> ServiceResult<Appointment> {
        let new = self.prepare(input)?;
        let appointment = self.repo.create(&new).await?;
        tracing::info!(appointment_id = appointment.id, "appointment created");
        Ok(appointment)
    }

    /// Public booking. A meeting link can only be set by staff later.
    pub async fn book(&self, input: CreateAppointmentInput) -> ServiceResult<Appointment> {
        self.create(CreateAppointmentInput {
            link_meet: None,
            ..input
        })
        .await
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Appointment> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("appointment", id))
    }

    /// List appointments, optionally filtered by a status string
    pub async fn list(&self, status: Option<&str>) -> ServiceResult<Vec<Appointment>> {
        let filter: Option<AppointmentStatus> = match status {
            Some(s) => Some(validate_status(EntityKind::Appointment, s)?.parse()?),
            None => None,
        };
        Ok(self.repo.list(filter).await?)
    }

    pub async fn list_pending(&self) -> ServiceResult<Vec<Appointment>> {
        Ok(self.repo.list(Some(AppointmentStatus::Pending)).await?)
    }

    /// Assign a staff member as host. Status is left untouched.
    pub async fn assign_host(&self, id: i64, host_id: i64) -> ServiceResult<Appointment> {
        if host_id <= 0 {
            return Err(ServiceError::invalid("host_id is required"));
        }

        let host = self.users.get_by_id(host_id).await?;
        if !host.is_some_and(|h| h.role.is_staff()) {
            return Err(ServiceError::not_found("staff member", host_id));
        }

        if !self.repo.assign_host(id, host_id).await? {
            return Err(ServiceError::not_found("appointment", id));
        }
        tracing::info!(appointment_id = id, host_id, "appointment host assigned");
        self.get(id).await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> ServiceResult<Transition> {
        Ok(self
            .workflow
            .transition(EntityKind::Appointment, id, status)
            .await?)
    }

    fn prepare(&self, input: CreateAppointmentInput) -> ServiceResult<NewAppointment> {
        let name = input.name.trim();
        let email = input.email.trim();
        let (date_of_booking, time) = match (input.date_of_booking, input.time) {
            (Some(d), Some(t)) if !name.is_empty() && !email.is_empty() => (d, t),
            _ => return Err(ServiceError::invalid("all fields are required")),
        };

        let link_meet = input
            .link_meet
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        if let Some(link) = &link_meet {
            optional_url("link_meet", link)?;
        }

        Ok(NewAppointment {
            name: name.to_string(),
            phone_number: input.phone_number.trim().to_string(),
            email: email.to_string(),
            date_of_booking,
            time,
            link_meet,
            status: WorkflowService::initial_status(EntityKind::Appointment).parse()?,
            pdf_file: input.pdf_file,
            img: input.img,
        })
    }
}
