//! API middleware
//!
//! Contains:
//! - Shared application state and its wiring
//! - The JSON error envelope and its mapping from service errors
//! - Authentication (session token validation)
//! - Authorization (admin and staff gates)

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, MAX_SESSION_EXPIRATION_DAYS};
use crate::db::repositories::{
    SqlxAppointmentRepository, SqlxArticleRepository, SqlxCategoryRepository,
    SqlxCommentRepository, SqlxNotificationRepository, SqlxSessionRepository,
    SqlxStatusRepository, SqlxTestimonialRepository, SqlxUserRepository, SqlxVideoRepository,
    SqlxWebinarRepository,
};
use crate::db::DynDatabasePool;
use crate::models::Identity;
use crate::services::{
    AppointmentService, ArticleService, CategoryService, CommentService, NotificationDispatcher,
    NotificationService, ServiceError, TestimonialService, UserService, VideoService,
    WebinarService, WorkflowService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub category_service: Arc<CategoryService>,
    pub article_service: Arc<ArticleService>,
    pub video_service: Arc<VideoService>,
    pub comment_service: Arc<CommentService>,
    pub testimonial_service: Arc<TestimonialService>,
    pub appointment_service: Arc<AppointmentService>,
    pub webinar_service: Arc<WebinarService>,
    pub notification_service: Arc<NotificationService>,
    /// Lifetime of the session cookie in seconds
    pub session_max_age: i64,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(
        pool: DynDatabasePool,
        config: &Config,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let article_repo = SqlxArticleRepository::boxed(pool.clone());
        let workflow = Arc::new(WorkflowService::new(SqlxStatusRepository::boxed(
            pool.clone(),
        )));

        let notification_service = Arc::new(NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            dispatcher,
            config.notification.admin_whatsapp_number.clone(),
        ));

        let user_service = Arc::new(UserService::with_session_expiration(
            user_repo.clone(),
            SqlxSessionRepository::boxed(pool.clone()),
            config.auth.session_expiration_days,
        ));
        let category_service = Arc::new(CategoryService::new(category_repo.clone()));
        let article_service = Arc::new(ArticleService::new(
            article_repo.clone(),
            category_repo.clone(),
            workflow.clone(),
            notification_service.clone(),
        ));
        let video_service = Arc::new(VideoService::new(
            SqlxVideoRepository::boxed(pool.clone()),
            category_repo,
            workflow.clone(),
            notification_service.clone(),
        ));
        let comment_service = Arc::new(CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            article_repo,
            user_repo.clone(),
            workflow.clone(),
        ));
        let testimonial_service = Arc::new(TestimonialService::new(
            SqlxTestimonialRepository::boxed(pool.clone()),
            workflow.clone(),
        ));
        let appointment_service = Arc::new(AppointmentService::new(
            SqlxAppointmentRepository::boxed(pool.clone()),
            user_repo.clone(),
            workflow,
        ));
        let webinar_service = Arc::new(WebinarService::new(
            SqlxWebinarRepository::boxed(pool.clone()),
            user_repo,
        ));

        Self {
            pool,
            user_service,
            category_service,
            article_service,
            video_service,
            comment_service,
            testimonial_service,
            appointment_service,
            webinar_service,
            notification_service,
            session_max_age: config
                .auth
                .session_expiration_days
                .clamp(1, MAX_SESSION_EXPIRATION_DAYS)
                * 24
                * 60
                * 60,
        }
    }
}

/// Authenticated caller extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_STATUS" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => Self::validation_error(msg),
            ServiceError::InvalidStatus(msg) => Self::new("INVALID_STATUS", msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Unauthorized(msg) => Self::unauthorized(msg),
            ServiceError::Forbidden(msg) => Self::forbidden(msg),
            ServiceError::Conflict(msg) => Self::new("CONFLICT", msg),
            ServiceError::StorageFailure(e) => {
                tracing::error!(error = %format!("{:#}", e), "storage failure");
                Self::internal_error("Internal server error")
            }
            ServiceError::DependencyFailure(msg) => {
                tracing::error!(error = %msg, "dependency failure");
                Self::internal_error("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the [`ApiError`] envelope
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Session token from `Authorization: Bearer` or the `session` cookie.
/// The header wins when both are present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let identity = state.user_service.validate_session(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser(identity));
    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Staff authorization middleware (staff or admin)
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_staff() {
        return Err(ApiError::forbidden("Staff privileges required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer test-token-123")]);
        assert_eq!(extract_session_token(&h), Some("test-token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let h = headers(&[(header::COOKIE, "theme=dark; session=test-token-456")]);
        assert_eq!(extract_session_token(&h), Some("test-token-456".to_string()));
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer bearer-token"),
            (header::COOKIE, "session=cookie-token"),
        ]);
        assert_eq!(extract_session_token(&h), Some("bearer-token".to_string()));
    }

    #[test]
    fn test_extract_session_token_none() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        let basic = headers(&[(header::AUTHORIZATION, "Basic invalid")]);
        assert!(extract_session_token(&basic).is_none());
        let cleared = headers(&[(header::COOKIE, "session=")]);
        assert!(extract_session_token(&cleared).is_none());
    }

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::invalid("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                ServiceError::InvalidStatus("nope".into()),
                StatusCode::BAD_REQUEST,
                "INVALID_STATUS",
            ),
            (ServiceError::not_found("comment", 1), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                ServiceError::Unauthorized("who".into()),
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                ServiceError::StorageFailure(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                ServiceError::DependencyFailure("twilio".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.error.code, code);
        }
    }

    #[test]
    fn test_internal_detail_not_echoed() {
        let api: ApiError = ServiceError::StorageFailure(anyhow::anyhow!("secret dsn")).into();
        assert!(!api.error.message.contains("secret"));
    }

    fn gated_app(gate: &'static str) -> axum::Router {
        let router = axum::Router::new().route("/test", axum::routing::get(|| async { "ok" }));
        match gate {
            "admin" => router.route_layer(axum::middleware::from_fn(require_admin)),
            _ => router.route_layer(axum::middleware::from_fn(require_staff)),
        }
    }

    fn request_as(role: Option<UserRole>) -> axum::http::Request<axum::body::Body> {
        let mut builder = axum::http::Request::builder().uri("/test");
        if let Some(role) = role {
            builder = builder.extension(AuthenticatedUser(Identity {
                user_id: 1,
                name: "tester".into(),
                email: "tester@example.com".into(),
                role,
            }));
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_role_gates() {
        use tower::ServiceExt;

        let cases = [
            ("admin", None, StatusCode::UNAUTHORIZED),
            ("admin", Some(UserRole::Staff), StatusCode::FORBIDDEN),
            ("admin", Some(UserRole::Admin), StatusCode::OK),
            ("staff", Some(UserRole::User), StatusCode::FORBIDDEN),
            ("staff", Some(UserRole::Staff), StatusCode::OK),
            ("staff", Some(UserRole::Admin), StatusCode::OK),
        ];

        for (gate, role, expected) in cases {
            let response = gated_app(gate).oneshot(request_as(role)).await.unwrap();
            assert_eq!(response.status(), expected, "{} gate, role {:?}", gate, role);
        }
    }
}
