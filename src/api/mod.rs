//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api/v1`:
//! - Users, posts, categories, tags and comments
//! - Health check

pub mod categories;
pub mod comments;
pub mod error;
pub mod health;
pub mod posts;
pub mod tags;
pub mod users;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::repositories::{
    SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository, SqlxTagRepository,
    SqlxUserRepository,
};
use crate::lifecycle::LifecyclePipeline;
use crate::services::{
    CategoryService, CommentService, PostRepositories, PostService, TagService, UserService,
};

pub use error::{ApiError, ApiErrorDetail};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub category_service: Arc<CategoryService>,
    pub tag_service: Arc<TagService>,
    pub comment_service: Arc<CommentService>,
}

impl AppState {
    /// Wire repositories and services over one pool. Every service shares
    /// the same lifecycle pipeline.
    pub fn new(pool: SqlitePool, pipeline: Arc<LifecyclePipeline>) -> Self {
        let users = SqlxUserRepository::boxed(pool.clone());
        let posts = SqlxPostRepository::boxed(pool.clone());
        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let tags = SqlxTagRepository::boxed(pool.clone());
        let comments = SqlxCommentRepository::boxed(pool.clone());

        Self {
            user_service: Arc::new(UserService::new(users.clone(), pipeline.clone())),
            post_service: Arc::new(PostService::new(
                PostRepositories {
                    posts: posts.clone(),
                    users: users.clone(),
                    categories: categories.clone(),
                    tags: tags.clone(),
                    comments: comments.clone(),
                },
                pipeline.clone(),
            )),
            category_service: Arc::new(CategoryService::new(categories, pipeline.clone())),
            tag_service: Arc::new(TagService::new(tags, pipeline.clone())),
            comment_service: Arc::new(CommentService::new(comments, posts, users, pipeline)),
            pool,
        }
    }
}

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
        .nest("/comments", comments::router())
        .nest("/health", health::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any origin", cors_origin);
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
