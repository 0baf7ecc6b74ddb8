//! Testimonial model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::ModerationStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub comment: String,
    pub photo_profile: String,
    pub category_id: i64,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonialInput {
    pub name: String,
    pub comment: String,
    #[serde(default)]
    pub photo_profile: String,
    #[serde(default = "default_category")]
    pub category_id: i64,
}

fn default_category() -> i64 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTestimonialInput {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub photo_profile: Option<String>,
    pub category_id: Option<i64>,
}

impl UpdateTestimonialInput {
    pub fn apply_to(self, testimonial: &mut Testimonial) {
        if let Some(v) = self.name {
            testimonial.name = v;
        }
        if let Some(v) = self.comment {
            testimonial.comment = v;
        }
        if let Some(v) = self.photo_profile {
            testimonial.photo_profile = v;
        }
        if let Some(v) = self.category_id {
            testimonial.category_id = v;
        }
    }
}
