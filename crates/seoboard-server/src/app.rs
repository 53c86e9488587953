use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` - structured request/response logging via `tracing`.
/// 2. `CorsLayer` - the dashboard frontend is served from another origin.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/date-range", get(routes::date_range::get_date_range))
        // Snapshot-backed property reports
        .route(
            "/api/properties/{id}/refresh",
            post(routes::properties::refresh),
        )
        .route("/api/properties/{id}/status", get(routes::properties::status))
        .route(
            "/api/properties/{id}/directories",
            get(routes::properties::directories),
        )
        .route(
            "/api/properties/{id}/directories/export",
            get(routes::export::export_directories),
        )
        .route(
            "/api/properties/{id}/dimensions",
            get(routes::properties::dimensions),
        )
        .route(
            "/api/properties/{id}/performance",
            get(routes::properties::performance),
        )
        // Stateless reports over rows supplied by the caller
        .route(
            "/api/reports/directories",
            post(routes::reports::directories),
        )
        .route("/api/reports/dimensions", post(routes::reports::dimensions))
        .route(
            "/api/reports/performance",
            post(routes::reports::performance),
        )
        .route("/api/reports/rankings", post(routes::rankings::rankings))
        .route("/api/reports/workload", post(routes::workload::workload))
        .route("/api/reports/categories", post(routes::workload::categories))
        .route("/api/reports/maturity", post(routes::workload::maturity))
        .route("/api/reports/backlinks", post(routes::backlinks::backlinks))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive when no origins are configured; otherwise an exact allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
