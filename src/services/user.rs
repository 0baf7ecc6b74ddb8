//! User service
//!
//! Account management and authentication:
//! - Bootstrap registration (the first account becomes admin)
//! - Admin-created accounts with an explicit role
//! - Login/logout with opaque session tokens
//! - Session validation into a typed [`Identity`]

use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::MAX_SESSION_EXPIRATION_DAYS;
use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Identity, Session, Staff, User, UserRole};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::password::{
    hash_password, is_acceptable_password, verify_password, MIN_PASSWORD_LEN,
};

/// Default session lifetime in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Input for login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self::with_session_expiration(users, sessions, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a user service with a custom session lifetime
    pub fn with_session_expiration(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl: Duration::days(
                session_expiration_days.clamp(1, MAX_SESSION_EXPIRATION_DAYS),
            ),
        }
    }

    /// Register the very first account, which is always an admin.
    ///
    /// # Errors
    ///
    /// - `Forbidden` once any account exists
    /// - `InvalidInput` / `Conflict` as for [`UserService::create_account`]
    pub async fn register(&self, input: CreateUserInput) -> ServiceResult<User> {
        if self.users.count().await? > 0 {
            return Err(ServiceError::Forbidden(
                "Registration is closed; ask an administrator for an account".to_string(),
            ));
        }

        let user = self
            .create_account(CreateUserInput {
                role: Some(UserRole::Admin),
                ..input
            })
            .await?;
        tracing::info!(user_id = user.id, "bootstrap admin registered");
        Ok(user)
    }

    /// Create an account with the requested role (default `user`).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if name is empty, email is malformed or the password
    ///   is too short
    /// - `Conflict` if the email is already registered
    pub async fn create_account(&self, input: CreateUserInput) -> ServiceResult<User> {
        validate_account_input(&input)?;

        let email = input.email.trim().to_lowercase();
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let phone_number = input
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let role = input.role.unwrap_or_default();

        let user = User::new(
            input.name.trim().to_string(),
            email,
            password_hash,
            phone_number,
            role,
        );
        let created = self.users.create(&user).await?;
        tracing::info!(user_id = created.id, %role, "account created");
        Ok(created)
    }

    /// Check credentials and open a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput) -> ServiceResult<Session> {
        let email = input.email.trim().to_lowercase();
        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

        let user = self.users.get_by_email(&email).await?.ok_or_else(invalid)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(invalid());
        }

        if !user.is_active() {
            return Err(ServiceError::Unauthorized(
                "This account has been deactivated".to_string(),
            ));
        }

        let session = Session::issue(user.id, self.session_ttl);
        let session = self.sessions.create(&session).await?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(session)
    }

    /// Invalidate a session token. Unknown tokens are not an error.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.sessions.delete(token).await?;
        Ok(())
    }

    /// Resolve a session token to the caller's identity.
    ///
    /// Expired sessions are deleted on sight.
    pub async fn validate_session(&self, token: &str) -> ServiceResult<Identity> {
        let unauthorized = || ServiceError::Unauthorized("Invalid or expired session".to_string());

        let session = self.sessions.get_by_id(token).await?.ok_or_else(unauthorized)?;

        if session.is_expired() {
            self.sessions.delete(&session.id).await?;
            return Err(unauthorized());
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(unauthorized)?;

        if !user.is_active() {
            return Err(unauthorized());
        }

        Ok(user.identity())
    }

    pub async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// Accounts with the staff role
    pub async fn list_staff(&self) -> ServiceResult<Vec<Staff>> {
        let staff = self.users.list_by_role(UserRole::Staff).await?;
        Ok(staff.into_iter().map(Staff::from).collect())
    }

    /// Remove expired sessions; returns how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> ServiceResult<u64> {
        Ok(self.sessions.delete_expired().await?)
    }
}

fn validate_account_input(input: &CreateUserInput) -> ServiceResult<()> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::invalid("Name cannot be empty"));
    }
    if !is_valid_email(input.email.trim()) {
        return Err(ServiceError::invalid("Invalid email format"));
    }
    if !is_acceptable_password(&input.password) {
        return Err(ServiceError::invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
