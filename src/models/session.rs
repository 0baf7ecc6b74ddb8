//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque bearer token bound to one account until `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The token itself
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for `user_id` that lives for `ttl`.
    pub fn issue(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_expiry_and_unique_token() {
        let a = Session::issue(1, Duration::days(7));
        let b = Session::issue(1, Duration::days(7));
        assert_ne!(a.id, b.id);
        assert!(!a.is_expired());
        assert!(a.expires_at - a.created_at == Duration::days(7));
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let session = Session::issue(1, Duration::seconds(-1));
        assert!(session.is_expired());
    }
}
