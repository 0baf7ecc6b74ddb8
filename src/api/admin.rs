//! Admin API endpoints
//!
//! Everything under `/api/v1/admin` requires an admin session:
//! - Accounts and staff listing
//! - Categories
//! - Article and video CRUD plus publication status
//! - Appointment creation, host assignment and status
//! - Testimonial CRUD plus moderation
//! - Comment moderation, replies and deletion
//! - Webinar scheduling

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::common::{AssignHostRequest, StatusQuery, StatusRequest};
use crate::api::middleware::{ApiError, ApiJson, AppState, AuthenticatedUser};
use crate::models::{
    Appointment, Article, Category, Comment, CreateAppointmentInput, CreateArticleInput,
    CreateCategoryInput, CreateCommentInput, CreateTestimonialInput, CreateUserInput,
    CreateVideoInput, CreateWebinarInput, ReplyCommentInput, Staff, Testimonial,
    UpdateArticleInput, UpdateTestimonialInput, UpdateVideoInput, User, Video,
};
use crate::services::Transition;

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/users", post(create_user))
        .route("/staff", get(list_staff))
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        // Articles
        .route("/articles", get(list_articles).post(create_article))
        .route(
            "/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/articles/{id}/status", put(set_article_status))
        // Videos
        .route("/videos", get(list_videos).post(create_video))
        .route(
            "/videos/{id}",
            get(get_video).put(update_video).delete(delete_video),
        )
        .route("/videos/{id}/status", put(set_video_status))
        // Appointments
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/{id}/assign-host", post(assign_host))
        .route("/appointments/{id}/status", put(set_appointment_status))
        // Testimonials
        .route("/testimonials", get(list_testimonials).post(create_testimonial))
        .route(
            "/testimonials/{id}",
            get(get_testimonial)
                .put(update_testimonial)
                .delete(delete_testimonial),
        )
        .route("/testimonials/{id}/approve", put(approve_testimonial))
        .route("/testimonials/{id}/reject", put(reject_testimonial))
        // Comments
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}", axum::routing::delete(delete_comment))
        .route("/comments/{id}/approve", put(approve_comment))
        .route("/comments/{id}/reject", put(reject_comment))
        .route("/comments/{id}/reply", post(reply_comment))
        // Webinars
        .route("/webinars", post(create_webinar))
}

// ============================================================================
// Accounts
// ============================================================================

/// POST /api/v1/admin/users - Create an account with an explicit role
async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.user_service.create_account(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/admin/staff
async fn list_staff(State(state): State<AppState>) -> Result<Json<Vec<Staff>>, ApiError> {
    Ok(Json(state.user_service.list_staff().await?))
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// ============================================================================
// Articles
// ============================================================================

async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.article_service.list().await?))
}

/// POST /api/v1/admin/articles - Any `status` in the body is ignored
async fn create_article(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateArticleInput>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.article_service.create(&identity, body).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.get(id).await?))
}

async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateArticleInput>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.update(id, body).await?))
}

async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/articles/{id}/status
async fn set_article_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.article_service.set_status(id, &body.status).await?))
}

// ============================================================================
// Videos
// ============================================================================

async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<Video>>, ApiError> {
    Ok(Json(state.video_service.list().await?))
}

async fn create_video(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateVideoInput>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let video = state.video_service.create(&identity, body).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Video>, ApiError> {
    Ok(Json(state.video_service.get(id).await?))
}

async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateVideoInput>,
) -> Result<Json<Video>, ApiError> {
    Ok(Json(state.video_service.update(id, body).await?))
}

async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.video_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_video_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.video_service.set_status(id, &body.status).await?))
}

// ============================================================================
// Appointments
// ============================================================================

async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(state.appointment_service.list(query.filter()).await?))
}

async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = state.appointment_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// POST /api/v1/admin/appointments/{id}/assign-host - Status is not changed
async fn assign_host(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<AssignHostRequest>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(
        state.appointment_service.assign_host(id, body.host_id).await?,
    ))
}

async fn set_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(
        state.appointment_service.update_status(id, &body.status).await?,
    ))
}

// ============================================================================
// Testimonials
// ============================================================================

async fn list_testimonials(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    Ok(Json(state.testimonial_service.list(query.filter()).await?))
}

async fn create_testimonial(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTestimonialInput>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    let testimonial = state.testimonial_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Testimonial>, ApiError> {
    Ok(Json(state.testimonial_service.get(id).await?))
}

async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateTestimonialInput>,
) -> Result<Json<Testimonial>, ApiError> {
    Ok(Json(state.testimonial_service.update(id, body).await?))
}

async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.testimonial_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.testimonial_service.approve(id).await?))
}

async fn reject_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.testimonial_service.reject(id).await?))
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

async fn approve_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.comment_service.approve(id).await?))
}

async fn reject_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transition>, ApiError> {
    Ok(Json(state.comment_service.reject(id).await?))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/comments/{id}/reply - The reply starts pending
async fn reply_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ReplyCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let reply = state.comment_service.reply(&identity, id, body).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

// ============================================================================
// Webinars
// ============================================================================

async fn create_webinar(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateWebinarInput>,
) -> Result<impl IntoResponse, ApiError> {
    let webinar = state.webinar_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(webinar)))
}
