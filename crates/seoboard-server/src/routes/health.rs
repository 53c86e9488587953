use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// `GET /health` - liveness check.
///
/// The service holds no connections of its own, so it is healthy whenever it
/// can answer. Upstream availability shows up per property in
/// `GET /api/properties/{id}/status` instead.
#[tracing::instrument]
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
