//! Post model
//!
//! This module provides:
//! - `Post` entity representing a news article
//! - `PostDetail`, a post with its comments
//! - Input types for creating and updating posts
//!
//! Callers never set `alias`: it is derived from the title when the post is
//! created, and neither input type carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Comment;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly alias derived from the title at creation
    pub alias: String,
    /// Body text
    pub content: String,
    /// Cover image path or URL
    pub image: String,
    /// Author user ID
    pub user_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Attached tag IDs
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, not yet persisted post with an empty alias.
    pub fn new(
        title: String,
        content: String,
        image: String,
        user_id: i64,
        category_id: i64,
        tag_ids: Vec<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            title,
            alias: String::new(),
            content,
            image,
            user_id,
            category_id,
            tag_ids,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post together with its comments, oldest comment first
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub image: String,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl CreatePostInput {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        image: impl Into<String>,
        user_id: i64,
        category_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: image.into(),
            user_id,
            category_id,
            tag_ids: Vec::new(),
        }
    }

    /// Attach tags
    pub fn with_tags(mut self, tag_ids: Vec<i64>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

/// Input for updating a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}
