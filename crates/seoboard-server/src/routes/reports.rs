//! Stateless report endpoints: the caller posts rows it already holds and
//! gets the aggregate back.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use seoboard_core::delta::compare;
use seoboard_core::directory::directory_report;
use seoboard_core::metrics::{aggregate, dimension_report, MetricRow, PeriodTotals};
use seoboard_core::pager::paginate;
use seoboard_core::snapshot::validate_rows;

use crate::{
    error::AppError,
    routes::params::{page_params, pagination_json, parse_depth},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct DirectoryReportRequest {
    pub rows: Vec<MetricRow>,
    pub depth: Option<usize>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `POST /api/reports/directories`
pub async fn directories(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DirectoryReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_rows(&req.rows)?;
    let depth = parse_depth(req.depth, state.config.default_depth)?;
    let (page, page_size) = page_params(req.page, req.page_size);

    let report = directory_report(&req.rows, depth)?;
    let page = paginate(&report, page, page_size)?;

    Ok(Json(json!({
        "data": {
            "depth": depth,
            "totals": aggregate(&req.rows),
            "directories": page.items,
        },
        "pagination": pagination_json(&page),
    })))
}

#[derive(Debug, Deserialize)]
pub struct DimensionReportRequest {
    pub rows: Vec<MetricRow>,
    #[serde(default)]
    pub exclude_brand: bool,
    pub brand_terms: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `POST /api/reports/dimensions`
pub async fn dimensions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DimensionReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_rows(&req.rows)?;
    let (page, page_size) = page_params(req.page, req.page_size);

    let mut rows = dimension_report(&req.rows);
    if req.exclude_brand {
        let filter = super::brand_filter_for(&state, req.brand_terms.as_deref());
        rows = filter.exclude(rows, |row| row.key.as_str());
    }
    let page = paginate(&rows, page, page_size)?;

    Ok(Json(json!({
        "data": { "rows": page.items },
        "pagination": pagination_json(&page),
    })))
}

#[derive(Debug, Deserialize)]
pub struct PerformanceRequest {
    pub current: Vec<MetricRow>,
    pub previous: Vec<MetricRow>,
}

/// `POST /api/reports/performance` - Period totals and deltas.
pub async fn performance(
    Json(req): Json<PerformanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_rows(&req.current)?;
    validate_rows(&req.previous)?;

    let comparison = compare(
        PeriodTotals::from_rows(&req.current),
        PeriodTotals::from_rows(&req.previous),
    );
    Ok(Json(json!({ "data": comparison })))
}
