//! Health check
//!
//! - GET /api/v1/health - Liveness plus a database round trip

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    crate::db::ping(&state.pool).await.map_err(|e| {
        tracing::error!(error = ?e, "Health check failed");
        ApiError::internal_error("Database unavailable")
    })?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
