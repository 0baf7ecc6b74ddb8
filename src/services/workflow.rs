//! Status workflow engine
//!
//! Validates a requested status against the kind's domain and applies it.
//! Order matters: validation happens before any storage access, then the
//! row's existence is checked, then a single UPDATE is issued. Transitions
//! are permissive: any member of the domain may follow any other, and
//! re-applying the current status is a successful no-op write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::repositories::StatusRepository;
use crate::models::{validate_status, EntityKind, WorkflowError};

/// A status change that was persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub kind: EntityKind,
    pub id: i64,
    pub from: String,
    pub to: &'static str,
    pub updated_at: DateTime<Utc>,
}

pub struct WorkflowService {
    repo: Arc<dyn StatusRepository>,
}

impl WorkflowService {
    pub fn new(repo: Arc<dyn StatusRepository>) -> Self {
        Self { repo }
    }

    /// The status every new row of `kind` is created with
    pub fn initial_status(kind: EntityKind) -> &'static str {
        kind.domain().initial
    }

    /// Move row `id` of `kind` to `requested`.
    pub async fn transition(
        &self,
        kind: EntityKind,
        id: i64,
        requested: &str,
    ) -> Result<Transition, WorkflowError> {
        let to = validate_status(kind, requested)?;

        let from = self
            .repo
            .current_status(kind, id)
            .await?
            .ok_or(WorkflowError::NotFound { kind, id })?;

        let updated_at = Utc::now();
        if !self.repo.set_status(kind, id, to, updated_at).await? {
            return Err(WorkflowError::NotFound { kind, id });
        }

        tracing::info!(%kind, id, from = %from, to, "status transition applied");

        Ok(Transition {
            kind,
            id,
            from,
            to,
            updated_at,
        })
    }
}
