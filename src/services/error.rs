//! Service error taxonomy
//!
//! Every service returns [`ServiceError`]. Repositories speak `anyhow`, which
//! lands in `StorageFailure`; workflow and notification errors are mapped
//! variant by variant.

use thiserror::Error;

use crate::models::WorkflowError;
use crate::services::notifier::NotificationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request failed validation before any storage access
    #[error("{0}")]
    InvalidInput(String),

    /// Requested status is outside the kind's domain
    #[error("{0}")]
    InvalidStatus(String),

    #[error("{0}")]
    NotFound(String),

    /// Missing or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0:#}")]
    StorageFailure(#[from] anyhow::Error),

    /// An outbound collaborator failed
    #[error("dependency failure: {0}")]
    DependencyFailure(String),
}

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(what: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {} not found", what, id))
    }
}

impl From<WorkflowError> for ServiceError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidStatus { .. } => Self::InvalidStatus(err.to_string()),
            WorkflowError::NotFound { .. } => Self::NotFound(err.to_string()),
            WorkflowError::Storage(e) => Self::StorageFailure(e),
        }
    }
}

impl From<NotificationError> for ServiceError {
    fn from(err: NotificationError) -> Self {
        Self::DependencyFailure(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    #[test]
    fn test_workflow_errors_map_by_variant() {
        let invalid: ServiceError = WorkflowError::InvalidStatus {
            kind: EntityKind::Appointment,
            status: "archived".into(),
        }
        .into();
        assert!(matches!(invalid, ServiceError::InvalidStatus(ref m) if m.contains("archived")));

        let missing: ServiceError = WorkflowError::NotFound {
            kind: EntityKind::Comment,
            id: 7,
        }
        .into();
        assert!(matches!(missing, ServiceError::NotFound(ref m) if m == "comment 7 not found"));

        let storage: ServiceError = WorkflowError::Storage(anyhow::anyhow!("disk")).into();
        assert!(matches!(storage, ServiceError::StorageFailure(_)));
    }
}
