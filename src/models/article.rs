//! Article model
//!
//! Articles are uploaded by staff (or admins) and start in
//! `pending approval`; only an admin transition publishes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::PublicationStatus;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    /// URL-friendly slug derived from the title
    pub slug: String,
    pub tags: Vec<String>,
    pub content: String,
    /// Note from the uploader to the reviewer
    pub message: String,
    pub thumbnail: String,
    pub alt_thumbnail: String,
    pub banner: String,
    pub alt_banner: String,
    pub poster: String,
    pub alt_poster: String,
    pub link_video: String,
    pub status: PublicationStatus,
    pub meta_title: String,
    pub meta_description: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article.
///
/// There is deliberately no `status` field; unknown keys in a request body
/// are dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateArticleInput {
    pub category_id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub message: String,
    pub thumbnail: String,
    pub alt_thumbnail: String,
    pub banner: String,
    pub alt_banner: String,
    pub poster: String,
    pub alt_poster: String,
    pub link_video: String,
    pub meta_title: String,
    pub meta_description: String,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateArticleInput {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub content: Option<String>,
    pub message: Option<String>,
    pub thumbnail: Option<String>,
    pub alt_thumbnail: Option<String>,
    pub banner: Option<String>,
    pub alt_banner: Option<String>,
    pub poster: Option<String>,
    pub alt_poster: Option<String>,
    pub link_video: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl UpdateArticleInput {
    /// Apply the present fields onto `article`.
    pub fn apply_to(self, article: &mut Article) {
        if let Some(v) = self.category_id {
            article.category_id = v;
        }
        if let Some(v) = self.title {
            article.title = v;
        }
        if let Some(v) = self.tags {
            article.tags = v;
        }
        if let Some(v) = self.content {
            article.content = v;
        }
        if let Some(v) = self.message {
            article.message = v;
        }
        if let Some(v) = self.thumbnail {
            article.thumbnail = v;
        }
        if let Some(v) = self.alt_thumbnail {
            article.alt_thumbnail = v;
        }
        if let Some(v) = self.banner {
            article.banner = v;
        }
        if let Some(v) = self.alt_banner {
            article.alt_banner = v;
        }
        if let Some(v) = self.poster {
            article.poster = v;
        }
        if let Some(v) = self.alt_poster {
            article.alt_poster = v;
        }
        if let Some(v) = self.link_video {
            article.link_video = v;
        }
        if let Some(v) = self.meta_title {
            article.meta_title = v;
        }
        if let Some(v) = self.meta_description {
            article.meta_description = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_ignores_status() {
        let input: CreateArticleInput = serde_json::from_str(
            r#"{"title":"Hello","content":"Body","category_id":1,"status":"approval"}"#,
        )
        .unwrap();
        assert_eq!(input.title, "Hello");
        assert!(input.tags.is_empty());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut article = Article {
            id: 1,
            category_id: 1,
            title: "Old".into(),
            slug: "old".into(),
            tags: vec!["a".into()],
            content: "c".into(),
            message: String::new(),
            thumbnail: String::new(),
            alt_thumbnail: String::new(),
            banner: String::new(),
            alt_banner: String::new(),
            poster: String::new(),
            alt_poster: String::new(),
            link_video: String::new(),
            status: PublicationStatus::Approval,
            meta_title: String::new(),
            meta_description: String::new(),
            author_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        UpdateArticleInput {
            title: Some("New".into()),
            ..Default::default()
        }
        .apply_to(&mut article);

        assert_eq!(article.title, "New");
        assert_eq!(article.tags, vec!["a".to_string()]);
        assert_eq!(article.status, PublicationStatus::Approval);
    }
}
