//! Staff API endpoints
//!
//! Routes under `/api/v1/staff`, open to staff and admin accounts. Uploads
//! land in the kind's initial status and notify the admin out of band.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, ApiJson, AppState, AuthenticatedUser};
use crate::models::{
    Appointment, Article, Comment, CreateAppointmentInput, CreateArticleInput, CreateCommentInput,
    CreateTestimonialInput, CreateVideoInput, Notification, ReplyCommentInput, Testimonial,
    UpdateTestimonialInput, Video, Webinar,
};

/// Build the staff router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/{id}", get(get_article))
        .route("/videos", get(list_videos).post(create_video))
        .route("/videos/{id}", get(get_video))
        .route(
            "/testimonials",
            get(list_pending_testimonials).post(create_testimonial),
        )
        .route(
            "/testimonials/{id}",
            put(update_pending_testimonial).delete(delete_pending_testimonial),
        )
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}", delete(delete_own_comment))
        .route("/comments/{id}/reply", post(reply_comment))
        .route("/comments/user/{id}", delete(delete_user_comment))
        .route("/webinars", get(list_webinars))
        .route("/webinars/{id}", get(get_webinar))
        .route(
            "/appointments",
            get(list_pending_appointments).post(create_appointment),
        )
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", put(mark_notification_read))
}

// ============================================================================
// Uploads
// ============================================================================

/// POST /api/v1/staff/articles - Upload an article for approval
async fn create_article(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateArticleInput>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.article_service.create(&identity, body).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.article_service.list().await?))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.get(id).await?))
}

/// POST /api/v1/staff/videos - Upload a video for approval
async fn create_video(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateVideoInput>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let video = state.video_service.create(&identity, body).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<Video>>, ApiError> {
    Ok(Json(state.video_service.list().await?))
}

async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Video>, ApiError> {
    Ok(Json(state.video_service.get(id).await?))
}

// ============================================================================
// Testimonials
// ============================================================================

async fn create_testimonial(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTestimonialInput>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    let testimonial = state.testimonial_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

async fn list_pending_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    Ok(Json(state.testimonial_service.list_pending().await?))
}

/// PUT /api/v1/staff/testimonials/{id} - 404 unless the row is still pending
async fn update_pending_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateTestimonialInput>,
) -> Result<Json<Testimonial>, ApiError> {
    Ok(Json(
        state.testimonial_service.update_pending(id, body).await?,
    ))
}

async fn delete_pending_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.testimonial_service.delete_pending(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

async fn list_comments(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.comment_service.list().await?))
}

async fn create_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comment_service.create(&identity, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn reply_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ReplyCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let reply = state.comment_service.reply(&identity, id, body).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// DELETE /api/v1/staff/comments/{id} - Only the author may delete
async fn delete_own_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete_own(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/staff/comments/user/{id} - Comments written by end users only
async fn delete_user_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .comment_service
        .delete_user_comment(&identity, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Webinars & appointments
// ============================================================================

async fn list_webinars(State(state): State<AppState>) -> Result<Json<Vec<Webinar>>, ApiError> {
    Ok(Json(state.webinar_service.list().await?))
}

async fn get_webinar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Webinar>, ApiError> {
    Ok(Json(state.webinar_service.get(id).await?))
}

async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = state.appointment_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn list_pending_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(state.appointment_service.list_pending().await?))
}

// ============================================================================
// Notifications
// ============================================================================

/// GET /api/v1/staff/notifications - The caller's own notifications
async fn list_notifications(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notification_service.list_for(&identity).await?))
}

async fn mark_notification_read(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.notification_service.mark_read(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
