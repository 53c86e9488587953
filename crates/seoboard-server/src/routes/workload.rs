//! Workflow reports over tasks, tickets and maturity criteria.

use axum::{response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use seoboard_core::rollup::{
    due_windows, maturity_rollup, rollup, rollup_nested, sorted_by_count, workload_by_assignee,
    MaturityItem, WorkItem,
};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WorkloadRequest {
    pub items: Vec<WorkItem>,
    /// Reference time for overdue/upcoming; defaults to the server clock.
    pub now: Option<DateTime<Utc>>,
}

/// `POST /api/reports/workload` - Per-assignee workload, status × priority
/// matrix and due-date windows.
pub async fn workload(Json(req): Json<WorkloadRequest>) -> Result<impl IntoResponse, AppError> {
    let now = req.now.unwrap_or_else(Utc::now);

    Ok(Json(json!({
        "data": {
            "now": now,
            "total": req.items.len(),
            "by_assignee": workload_by_assignee(&req.items, now),
            "status_by_priority": rollup_nested(
                &req.items,
                |i| Some(i.status.as_str()),
                |i| i.priority.as_deref(),
            ),
            "due": due_windows(&req.items, now),
        }
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Status,
    Priority,
    Assignee,
    Category,
}

fn field(item: &WorkItem, by: GroupField) -> Option<&str> {
    match by {
        GroupField::Status => Some(item.status.as_str()),
        GroupField::Priority => item.priority.as_deref(),
        GroupField::Assignee => item.assignee.as_deref(),
        GroupField::Category => item.category.as_deref(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesRequest {
    pub items: Vec<WorkItem>,
    pub group_by: GroupField,
    pub sub_group_by: Option<GroupField>,
}

/// `POST /api/reports/categories` - Counts per field, optionally broken
/// down by a second field.
pub async fn categories(
    Json(req): Json<CategoriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.sub_group_by == Some(req.group_by) {
        return Err(AppError::BadRequest(
            "sub_group_by must differ from group_by".to_string(),
        ));
    }

    let groups = match req.sub_group_by {
        Some(sub) => rollup_nested(
            &req.items,
            |i| field(i, req.group_by),
            |i| field(i, sub),
        ),
        None => rollup(&req.items, |i| field(i, req.group_by)),
    };
    let ordered: Vec<_> = sorted_by_count(&groups)
        .into_iter()
        .map(|(key, count)| json!({ "name": key, "value": count }))
        .collect();

    Ok(Json(json!({
        "data": {
            "groups": groups,
            "ordered": ordered,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct MaturityRequest {
    pub items: Vec<MaturityItem>,
}

/// `POST /api/reports/maturity` - Maturity model by category.
pub async fn maturity(Json(req): Json<MaturityRequest>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({ "data": { "categories": maturity_rollup(&req.items) } })))
}
