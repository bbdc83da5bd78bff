//! Category service
//!
//! Implements business logic for category management:
//! - Create through the lifecycle pipeline (alias derived from the name)
//! - List, get by ID
//! - Rename (the alias set at creation is kept)

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::CategoryRepository;
use crate::lifecycle::{CreateError, LifecyclePipeline};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::validation;

const NAME_REQUIRED: &str = "N'oubliez pas votre nom de catégorie.";

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CreateError> for CategoryServiceError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Rejected { source, .. } => {
                CategoryServiceError::ValidationError(source.to_string())
            }
            CreateError::Persistence(e) => CategoryServiceError::InternalError(e),
        }
    }
}

/// Category service for managing news categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    pipeline: Arc<LifecyclePipeline>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>, pipeline: Arc<LifecyclePipeline>) -> Self {
        Self { repo, pipeline }
    }

    /// Create a new category. The alias is derived from the name.
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        validation::required_text(&input.name, NAME_REQUIRED)
            .map_err(CategoryServiceError::ValidationError)?;

        let category = Category::new(input.name.trim().to_string());

        let repo = self.repo.clone();
        let created = self
            .pipeline
            .run_create(category, move |c| async move { repo.create(&c).await })
            .await?;

        tracing::info!(category_id = created.id, alias = %created.alias, "Category created");
        Ok(created)
    }

    /// Get a category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(id))
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Update a category. Renaming never changes the alias.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut category = self.get_by_id(id).await?;

        if let Some(name) = input.name {
            validation::required_text(&name, NAME_REQUIRED)
                .map_err(CategoryServiceError::ValidationError)?;
            category.name = name.trim().to_string();
        }

        Ok(self
            .repo
            .update(&category)
            .await
            .context("Failed to update category")?)
    }
}
