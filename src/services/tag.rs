//! Tag service

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::TagRepository;
use crate::lifecycle::{CreateError, LifecyclePipeline};
use crate::models::{CreateTagInput, Tag};
use crate::services::validation;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CreateError> for TagServiceError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Rejected { source, .. } => TagServiceError::ValidationError(source.to_string()),
            CreateError::Persistence(e) => TagServiceError::InternalError(e),
        }
    }
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
    pipeline: Arc<LifecyclePipeline>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepository>, pipeline: Arc<LifecyclePipeline>) -> Self {
        Self { repo, pipeline }
    }

    /// Create a new tag
    pub async fn create(&self, input: CreateTagInput) -> Result<Tag, TagServiceError> {
        validation::required_text(&input.name, "N'oubliez pas votre nom de tag.")
            .map_err(TagServiceError::ValidationError)?;

        let repo = self.repo.clone();
        let created = self
            .pipeline
            .run_create(Tag::new(input.name.trim().to_string()), move |t| async move {
                repo.create(&t).await
            })
            .await?;

        Ok(created)
    }

    /// Get a tag by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or(TagServiceError::NotFound(id))
    }

    /// List all tags
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.repo.list().await.context("Failed to list tags")?)
    }
}
