use axum::{extract::Query, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, routes::params::resolve_range};

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `GET /api/date-range` - Resolve a filter-bar preset to concrete dates,
/// together with the equal-length period before it.
pub async fn get_date_range(
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Utc::now().date_naive();
    let (preset, range) = resolve_range(
        query.preset.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
        today,
    )?;
    let previous = range.previous_period()?;

    Ok(Json(json!({
        "data": {
            "preset": preset,
            "range": range,
            "previous": previous,
            "days": range.days(),
        }
    })))
}
