//! Video model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::PublicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub link_video: String,
    pub category_id: i64,
    pub status: PublicationStatus,
    pub author_id: i64,
    pub meta_title: String,
    pub meta_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVideoInput {
    pub title: String,
    pub description: String,
    pub link_video: String,
    pub category_id: i64,
    pub meta_title: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link_video: Option<String>,
    pub category_id: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl UpdateVideoInput {
    pub fn apply_to(self, video: &mut Video) {
        if let Some(v) = self.title {
            video.title = v;
        }
        if let Some(v) = self.description {
            video.description = v;
        }
        if let Some(v) = self.link_video {
            video.link_video = v;
        }
        if let Some(v) = self.category_id {
            video.category_id = v;
        }
        if let Some(v) = self.meta_title {
            video.meta_title = v;
        }
        if let Some(v) = self.meta_description {
            video.meta_description = v;
        }
    }
}
