use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use seoboard_core::backlinks::{sort_backlinks, summarize, BacklinkRow, BacklinkSortKey};
use seoboard_core::pager::{paginate, SortDirection};

use crate::{
    error::AppError,
    routes::params::{page_params, pagination_json, parse_direction},
};

#[derive(Debug, Deserialize)]
pub struct BacklinksRequest {
    pub backlinks: Vec<BacklinkRow>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `POST /api/reports/backlinks` - Backlink summary plus a sorted page of links.
///
/// Sorting defaults to domain rating, strongest first.
pub async fn backlinks(Json(req): Json<BacklinksRequest>) -> Result<impl IntoResponse, AppError> {
    let sort_key = req
        .sort
        .as_deref()
        .map(str::parse::<BacklinkSortKey>)
        .transpose()?
        .unwrap_or_default();
    let direction = parse_direction(req.direction.as_deref(), SortDirection::Desc)?;
    let (page, page_size) = page_params(req.page, req.page_size);

    let summary = summarize(&req.backlinks);
    let mut rows = req.backlinks;
    sort_backlinks(&mut rows, sort_key, direction);
    let page = paginate(&rows, page, page_size)?;

    Ok(Json(json!({
        "data": {
            "summary": summary,
            "backlinks": page.items,
        },
        "pagination": pagination_json(&page),
    })))
}
