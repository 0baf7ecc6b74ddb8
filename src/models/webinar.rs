//! Webinar model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webinar {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub link_meet: String,
    pub host_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateWebinarInput {
    pub title: String,
    pub description: String,
    pub link_meet: String,
    pub host_id: i64,
}
