use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use seoboard_core::filter::matches_search;
use seoboard_core::pager::{paginate, SortDirection};
use seoboard_core::ranking::{
    ranking_stats, sort_keywords, tier_distribution, KeywordSortKey, Movement, Tier,
    TrackedKeyword,
};
use seoboard_core::rollup::{rollup, sorted_by_count};

use crate::{
    error::AppError,
    routes::params::{page_params, pagination_json, parse_direction},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RankingsRequest {
    pub keywords: Vec<TrackedKeyword>,
    #[serde(default)]
    pub exclude_brand: bool,
    pub brand_terms: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
struct KeywordView {
    #[serde(flatten)]
    keyword: TrackedKeyword,
    tier: Tier,
    movement: Movement,
}

#[derive(Debug, Serialize)]
struct CategoryStat {
    category: String,
    count: u64,
}

/// `POST /api/reports/rankings` - Rank tracking overview and keyword table.
///
/// Filters apply in order brand exclusion, category, search text; stats,
/// distribution and category counts are computed over what remains.
pub async fn rankings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RankingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let sort_key = req
        .sort
        .as_deref()
        .map(str::parse::<KeywordSortKey>)
        .transpose()?
        .unwrap_or_default();
    let direction = parse_direction(req.direction.as_deref(), SortDirection::Asc)?;
    let (page, page_size) = page_params(req.page, req.page_size);

    let mut keywords = req.keywords;
    if req.exclude_brand {
        let filter = super::brand_filter_for(&state, req.brand_terms.as_deref());
        keywords = filter.exclude(keywords, |k| k.keyword.as_str());
    }
    if let Some(category) = req.category.as_deref().filter(|c| !c.is_empty()) {
        keywords.retain(|k| k.category.as_deref() == Some(category));
    }
    if let Some(search) = req.search.as_deref() {
        keywords.retain(|k| matches_search(&k.keyword, search));
    }

    let stats = ranking_stats(&keywords);
    let distribution = tier_distribution(&stats);
    let category_stats: Vec<CategoryStat> =
        sorted_by_count(&rollup(&keywords, |k| k.category.as_deref()))
            .into_iter()
            .map(|(category, count)| CategoryStat { category, count })
            .collect();

    sort_keywords(&mut keywords, sort_key, direction);
    let views: Vec<KeywordView> = keywords
        .into_iter()
        .map(|keyword| KeywordView {
            tier: keyword.tier(),
            movement: keyword.movement(),
            keyword,
        })
        .collect();
    let page = paginate(&views, page, page_size)?;

    Ok(Json(json!({
        "data": {
            "stats": stats,
            "distribution": distribution,
            "category_stats": category_stats,
            "keywords": page.items,
        },
        "pagination": pagination_json(&page),
    })))
}
