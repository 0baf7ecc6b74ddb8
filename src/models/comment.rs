//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::ModerationStatus;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    /// Account that posted the comment, if it was posted while authenticated
    pub author_id: Option<i64>,
    /// Replied-to comment
    pub parent_id: Option<i64>,
    pub username: String,
    pub email: String,
    pub comment: String,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a comment.
///
/// `username` and `email` fall back to the caller's identity when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    pub article_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub comment: String,
}

/// Input for replying to an existing comment
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyCommentInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub comment: String,
}

/// A fully resolved comment ready for insertion
#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: i64,
    pub author_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub username: String,
    pub email: String,
    pub comment: String,
    pub status: ModerationStatus,
}
