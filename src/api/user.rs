//! Public end-user endpoints

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::api::middleware::{ApiError, ApiJson, AppState};
use crate::models::{Appointment, CreateAppointmentInput};

/// Build the `/user` router (no auth required)
pub fn router() -> Router<AppState> {
    Router::new().route("/appointments", post(book_appointment))
}

/// POST /api/v1/user/appointments - Book an appointment
///
/// The booking starts pending and any `link_meet` in the body is dropped.
async fn book_appointment(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = state.appointment_service.book(body).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
