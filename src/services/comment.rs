//! Comment service

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{CommentRepository, PostRepository, UserRepository};
use crate::lifecycle::{CreateError, LifecyclePipeline};
use crate::models::{Comment, CreateCommentInput};
use crate::services::validation;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment, post or author not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CreateError> for CommentServiceError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Rejected { source, .. } => {
                CommentServiceError::ValidationError(source.to_string())
            }
            CreateError::Persistence(e) => CommentServiceError::InternalError(e),
        }
    }
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    pipeline: Arc<LifecyclePipeline>,
}

impl CommentService {
    pub fn new(
        repo: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        pipeline: Arc<LifecyclePipeline>,
    ) -> Self {
        Self {
            repo,
            posts,
            users,
            pipeline,
        }
    }

    /// Create a comment on an existing post
    pub async fn create(&self, input: CreateCommentInput) -> Result<Comment, CommentServiceError> {
        validation::not_blank(&input.content, "N'oubliez pas votre commentaire.")
            .map_err(CommentServiceError::ValidationError)?;

        if self
            .posts
            .get_by_id(input.post_id)
            .await
            .context("Failed to get post")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound(format!("post {}", input.post_id)));
        }

        if self
            .users
            .get_by_id(input.user_id)
            .await
            .context("Failed to get user")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound(format!("user {}", input.user_id)));
        }

        let comment = Comment::new(input.post_id, input.user_id, input.content);

        let repo = self.repo.clone();
        let created = self
            .pipeline
            .run_create(comment, move |c| async move { repo.create(&c).await })
            .await?;

        tracing::info!(comment_id = created.id, post_id = created.post_id, "Comment created");
        Ok(created)
    }

    /// Get a comment by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Comment, CommentServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("comment {}", id)))
    }

    /// Delete a comment
    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete comment")?;

        if !deleted {
            return Err(CommentServiceError::NotFound(format!("comment {}", id)));
        }
        Ok(())
    }
}
