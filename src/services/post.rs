//! Post service
//!
//! Implements business logic for news posts:
//! - Create through the lifecycle pipeline (alias derived from the title)
//! - List (most recently updated first), get, get with comments
//! - Update editable fields and tags; the alias never changes
//! - Delete (comments are removed with the post)

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use crate::lifecycle::{CreateError, LifecyclePipeline};
use crate::models::{CreatePostInput, Post, PostDetail, UpdatePostInput};
use crate::services::validation;

const TITLE_REQUIRED: &str = "N'oubliez pas votre titre.";
const CONTENT_REQUIRED: &str = "N'oubliez pas votre contenu.";
const IMAGE_REQUIRED: &str = "N'oubliez pas votre image.";

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post, or an entity it references, not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CreateError> for PostServiceError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Rejected { source, .. } => PostServiceError::ValidationError(source.to_string()),
            CreateError::Persistence(e) => PostServiceError::InternalError(e),
        }
    }
}

/// Repositories the post service reads and writes
pub struct PostRepositories {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Post service
pub struct PostService {
    repos: PostRepositories,
    pipeline: Arc<LifecyclePipeline>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repos: PostRepositories, pipeline: Arc<LifecyclePipeline>) -> Self {
        Self { repos, pipeline }
    }

    /// Create a new post
    ///
    /// # Errors
    /// - `ValidationError` for blank or overlong fields
    /// - `NotFound` if the author, category or a tag does not exist
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        validation::required_text(&input.title, TITLE_REQUIRED)
            .and_then(|_| validation::not_blank(&input.content, CONTENT_REQUIRED))
            .and_then(|_| validation::required_text(&input.image, IMAGE_REQUIRED))
            .map_err(PostServiceError::ValidationError)?;

        self.ensure_user(input.user_id).await?;
        self.ensure_category(input.category_id).await?;
        self.ensure_tags(&input.tag_ids).await?;

        let post = Post::new(
            input.title.trim().to_string(),
            input.content,
            input.image.trim().to_string(),
            input.user_id,
            input.category_id,
            input.tag_ids,
        );

        let repo = self.repos.posts.clone();
        let created = self
            .pipeline
            .run_create(post, move |p| async move { repo.create(&p).await })
            .await?;

        tracing::info!(post_id = created.id, alias = %created.alias, "Post created");
        Ok(created)
    }

    /// Get a post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Post, PostServiceError> {
        self.repos
            .posts
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", id)))
    }

    /// Get a post with its comments
    pub async fn get_detail(&self, id: i64) -> Result<PostDetail, PostServiceError> {
        let post = self.get_by_id(id).await?;
        let comments = self
            .repos
            .comments
            .get_by_post(id)
            .await
            .context("Failed to get post comments")?;

        Ok(PostDetail { post, comments })
    }

    /// List all posts, most recently updated first
    pub async fn list(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self.repos.posts.list().await.context("Failed to list posts")?)
    }

    /// Update a post. Absent fields are left unchanged; `tag_ids`, when
    /// present, replaces the whole set. The alias is not recomputed.
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        let mut post = self.get_by_id(id).await?;

        if let Some(title) = input.title {
            validation::required_text(&title, TITLE_REQUIRED)
                .map_err(PostServiceError::ValidationError)?;
            post.title = title.trim().to_string();
        }

        if let Some(content) = input.content {
            validation::not_blank(&content, CONTENT_REQUIRED)
                .map_err(PostServiceError::ValidationError)?;
            post.content = content;
        }

        if let Some(image) = input.image {
            validation::required_text(&image, IMAGE_REQUIRED)
                .map_err(PostServiceError::ValidationError)?;
            post.image = image.trim().to_string();
        }

        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
            post.category_id = category_id;
        }

        if let Some(tag_ids) = input.tag_ids {
            self.ensure_tags(&tag_ids).await?;
            post.tag_ids = tag_ids;
        }

        Ok(self
            .repos
            .posts
            .update(&post)
            .await
            .context("Failed to update post")?)
    }

    /// Delete a post and its comments
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        let deleted = self
            .repos
            .posts
            .delete(id)
            .await
            .context("Failed to delete post")?;

        if !deleted {
            return Err(PostServiceError::NotFound(format!("post {}", id)));
        }

        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    async fn ensure_user(&self, id: i64) -> Result<(), PostServiceError> {
        match self.repos.users.get_by_id(id).await.context("Failed to get user")? {
            Some(_) => Ok(()),
            None => Err(PostServiceError::NotFound(format!("user {}", id))),
        }
    }

    async fn ensure_category(&self, id: i64) -> Result<(), PostServiceError> {
        match self
            .repos
            .categories
            .get_by_id(id)
            .await
            .context("Failed to get category")?
        {
            Some(_) => Ok(()),
            None => Err(PostServiceError::NotFound(format!("category {}", id))),
        }
    }

    async fn ensure_tags(&self, ids: &[i64]) -> Result<(), PostServiceError> {
        for &id in ids {
            if self
                .repos
                .tags
                .get_by_id(id)
                .await
                .context("Failed to get tag")?
                .is_none()
            {
                return Err(PostServiceError::NotFound(format!("tag {}", id)));
            }
        }
        Ok(())
    }
}
