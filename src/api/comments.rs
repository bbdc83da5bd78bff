//! Comment API endpoints
//!
//! - POST /api/v1/comments - Comment on a post
//! - GET /api/v1/comments/{id} - Get a comment
//! - DELETE /api/v1/comments/{id} - Delete a comment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::{ApiError, AppState};
use crate::models::{Comment, CreateCommentInput};

/// Build the comments router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/{id}", get(get_comment).delete(delete_comment))
}

/// POST /api/v1/comments
async fn create_comment(
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comment_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/comments/{id}
async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(state.comment_service.get_by_id(id).await?))
}

/// DELETE /api/v1/comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
