//! Routes backed by upstream snapshots of a Search Console property.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use seoboard_core::delta::compare;
use seoboard_core::directory::directory_report;
use seoboard_core::metrics::{aggregate, dimension_report, PeriodTotals};
use seoboard_core::pager::paginate;
use seoboard_core::snapshot::Dimension;

use crate::{
    error::AppError,
    routes::params::{
        page_params, pagination_json, parse_depth, parse_dimension, resolve_range,
    },
    state::{AppState, StoredSnapshot},
};

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub dimension: Option<String>,
    /// Fetch inline and report upstream failures in the response instead of
    /// scheduling a debounced refresh.
    #[serde(default)]
    pub wait: bool,
}

/// `POST /api/properties/{id}/refresh` - Pull a fresh snapshot from upstream.
///
/// By default the fetch is debounced and the call returns `202 Accepted`;
/// with `wait=true` it runs inline and returns the outcome.
#[tracing::instrument(skip(state))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Utc::now().date_naive();
    let (preset, range) = resolve_range(
        query.preset.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
        today,
    )?;
    let dimension = parse_dimension(query.dimension.as_deref())?;

    if query.wait {
        let applied = state
            .refresh_snapshot(&property_id, range, dimension)
            .await?;
        return Ok((
            StatusCode::OK,
            Json(json!({
                "data": {
                    "property_id": property_id,
                    "preset": preset,
                    "range": range,
                    "dimension": dimension,
                    "applied": applied,
                }
            })),
        ));
    }

    state.schedule_refresh(&property_id, range, dimension);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "data": {
                "property_id": property_id,
                "preset": preset,
                "range": range,
                "dimension": dimension,
                "status": "scheduled",
            }
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub dimension: Option<String>,
}

/// `GET /api/properties/{id}/status` - Outcome of the latest refresh.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let dimension = parse_dimension(query.dimension.as_deref())?;
    let status = state
        .refresh_status(&property_id, dimension)
        .ok_or_else(|| AppError::NotFound("No refresh requested for property".to_string()))?;
    Ok(Json(json!({ "data": status })))
}

pub(crate) fn require_snapshot(
    state: &AppState,
    property_id: &str,
    dimension: Dimension,
) -> Result<StoredSnapshot, AppError> {
    state.snapshot(property_id, dimension).ok_or_else(|| {
        AppError::NotFound(format!(
            "No {} snapshot loaded for property; refresh it first",
            dimension.as_str()
        ))
    })
}

#[derive(Debug, Deserialize)]
pub struct DirectoriesQuery {
    pub depth: Option<usize>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /api/properties/{id}/directories` - Page rows rolled up by URL
/// directory at the requested depth.
#[tracing::instrument(skip(state))]
pub async fn directories(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<DirectoriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let depth = parse_depth(query.depth, state.config.default_depth)?;
    let (page, page_size) = page_params(query.page, query.page_size);
    let snapshot = require_snapshot(&state, &property_id, Dimension::Page)?;

    let report = directory_report(&snapshot.rows, depth)?;
    let page = paginate(&report, page, page_size)?;

    Ok(Json(json!({
        "data": {
            "depth": depth,
            "range": snapshot.range,
            "fetched_at": snapshot.fetched_at,
            "totals": aggregate(snapshot.rows.iter()),
            "directories": page.items,
        },
        "pagination": pagination_json(&page),
    })))
}

#[derive(Debug, Deserialize)]
pub struct DimensionsQuery {
    pub dimension: Option<String>,
    /// Drop brand queries using the configured brand terms.
    #[serde(default)]
    pub exclude_brand: bool,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /api/properties/{id}/dimensions` - Query, country or device table.
pub async fn dimensions(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<DimensionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let dimension = parse_dimension(query.dimension.as_deref())?;
    let (page, page_size) = page_params(query.page, query.page_size);
    let snapshot = require_snapshot(&state, &property_id, dimension)?;

    let mut rows = dimension_report(&snapshot.rows);
    if query.exclude_brand {
        rows = state.brand_filter.exclude(rows, |row| row.key.as_str());
    }
    let page = paginate(&rows, page, page_size)?;

    Ok(Json(json!({
        "data": {
            "dimension": dimension,
            "range": snapshot.range,
            "rows": page.items,
        },
        "pagination": pagination_json(&page),
    })))
}

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `GET /api/properties/{id}/performance` - Totals for the selected range
/// against the equal-length period before it.
///
/// Both windows are fetched directly; nothing is stored.
#[tracing::instrument(skip(state))]
pub async fn performance(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<PerformanceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Utc::now().date_naive();
    let (preset, range) = resolve_range(
        query.preset.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
        today,
    )?;
    let previous_range = range.previous_period()?;

    let (current, previous) = tokio::try_join!(
        state
            .source
            .fetch_snapshot(&property_id, &range, Dimension::Page),
        state
            .source
            .fetch_snapshot(&property_id, &previous_range, Dimension::Page),
    )
    .map_err(|e| AppError::Upstream(format!("{e:#}")))?;

    let comparison = compare(
        PeriodTotals::from_rows(&current),
        PeriodTotals::from_rows(&previous),
    );

    Ok(Json(json!({
        "data": {
            "preset": preset,
            "range": range,
            "previous_range": previous_range,
            "comparison": comparison,
        }
    })))
}
