//! Post repository
//!
//! Database operations for posts and their tag links.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite
//!
//! A post row and its `post_tags` links are always written in one transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Post;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and its tag links
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID, with tag IDs
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List posts, most recently updated first
    async fn list(&self) -> Result<Vec<Post>>;

    /// Update editable fields and replace tag links. `alias` and
    /// `created_at` are left untouched.
    async fn update(&self, post: &Post) -> Result<Post>;

    /// Delete a post. Comments and tag links go with it.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, alias, content, image, user_id, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.alias)
        .bind(&post.content)
        .bind(&post.image)
        .bind(post.user_id)
        .bind(post.category_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?;

        let id = result.last_insert_rowid();
        let tag_ids = replace_tag_links(&mut tx, id, &post.tag_ids).await?;

        tx.commit().await.context("Failed to commit post")?;

        Ok(Post {
            id,
            tag_ids,
            ..post.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, alias, content, image, user_id, category_id, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tag_rows = sqlx::query("SELECT tag_id FROM post_tags WHERE post_id = ? ORDER BY tag_id")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to get post tags")?;

        let tag_ids = tag_rows.iter().map(|r| r.get("tag_id")).collect();
        Ok(Some(row_to_post(&row, tag_ids)))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, alias, content, image, user_id, category_id, created_at, updated_at
            FROM posts
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts")?;

        let link_rows = sqlx::query("SELECT post_id, tag_id FROM post_tags ORDER BY tag_id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list post tags")?;

        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &link_rows {
            links
                .entry(row.get("post_id"))
                .or_default()
                .push(row.get("tag_id"));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("id");
                row_to_post(row, links.remove(&id).unwrap_or_default())
            })
            .collect())
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, image = ?, category_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image)
        .bind(post.category_id)
        .bind(Utc::now())
        .bind(post.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update post")?;

        replace_tag_links(&mut tx, post.id, &post.tag_ids).await?;

        tx.commit().await.context("Failed to commit post update")?;

        self.get_by_id(post.id)
            .await?
            .context("Post not found after update")
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Replace the tag links of a post. Returns the linked tag IDs, sorted and
/// without duplicates.
async fn replace_tag_links(
    tx: &mut Transaction<'_, Sqlite>,
    post_id: i64,
    tag_ids: &[i64],
) -> Result<Vec<i64>> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut **tx)
        .await
        .context("Failed to clear post tags")?;

    let mut unique = tag_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    for tag_id in &unique {
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .with_context(|| format!("Failed to link tag {} to post {}", tag_id, post_id))?;
    }

    Ok(unique)
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow, tag_ids: Vec<i64>) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        alias: row.get("alias"),
        content: row.get("content"),
        image: row.get("image"),
        user_id: row.get("user_id"),
        category_id: row.get("category_id"),
        tag_ids,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
