use axum::{Json, Router, routing::get};

use crate::{ApiResponse, Ctx};

/// Liveness probe
/// GET /api/health
async fn health() -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        code: 200,
        message: "OK".to_string(),
        data: Some("healthy".to_string()),
    })
}

/// Mount health routes
pub fn mount() -> Router<Ctx> {
    Router::new().route("/health", get(health))
}
