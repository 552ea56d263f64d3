use axum::{http::StatusCode, Json};

use shared_http::api::HealthResponse;

/// GET /api/health
pub async fn health_check() -> Result<Json<HealthResponse>, StatusCode> {
    Ok(Json(HealthResponse {
        message: "OK".into(),
    }))
}
