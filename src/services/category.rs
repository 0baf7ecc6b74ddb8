//! Category service

use std::sync::Arc;

use crate::db::repositories::CategoryRepository;
use crate::models::{slugify, Category, CreateCategoryInput};
use crate::services::error::{ServiceError, ServiceResult};

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category; the slug is derived from the name unless given.
    pub async fn create(&self, input: CreateCategoryInput) -> ServiceResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("Category name cannot be empty"));
        }

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(name),
        };
        if slug.is_empty() {
            return Err(ServiceError::invalid(
                "Category slug must contain at least one letter or digit",
            ));
        }

        if self.repo.get_by_slug(&slug).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category slug '{}' already exists",
                slug
            )));
        }

        Ok(self.repo.create(name, &slug).await?)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.list().await?)
    }

    /// `InvalidInput` unless category `id` exists
    pub async fn ensure_exists(&self, id: i64) -> ServiceResult<Category> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(format!("Category {} does not exist", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::setup_pool;
    use crate::db::repositories::SqlxCategoryRepository;

    async fn service() -> CategoryService {
        CategoryService::new(SqlxCategoryRepository::boxed(setup_pool().await))
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let service = service().await;
        let c = service
            .create(CreateCategoryInput {
                name: "Mental Health".into(),
                slug: None,
            })
            .await
            .unwrap();
        assert_eq!(c.slug, "mental-health");
    }

    #[tokio::test]
    async fn test_explicit_slug_is_normalized() {
        let service = service().await;
        let c = service
            .create(CreateCategoryInput {
                name: "Parenting".into(),
                slug: Some("  Family Life ".into()),
            })
            .await
            .unwrap();
        assert_eq!(c.slug, "family-life");
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let service = service().await;
        let err = service
            .create(CreateCategoryInput {
                name: "General".into(),
                slug: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let service = service().await;
        for name in ["", "   ", "!!!"] {
            let err = service
                .create(CreateCategoryInput {
                    name: name.into(),
                    slug: None,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_ensure_exists() {
        let service = service().await;
        assert_eq!(service.ensure_exists(1).await.unwrap().slug, "general");
        assert!(matches!(
            service.ensure_exists(99).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
