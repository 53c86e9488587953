use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use seoboard_core::directory::{directory_report, DirectoryAggregate};
use seoboard_core::snapshot::Dimension;

use crate::{
    error::AppError,
    routes::{params::parse_depth, properties::require_snapshot},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub depth: Option<usize>,
    pub format: Option<String>,
}

/// `GET /api/properties/{id}/directories/export` - download the directory
/// report as CSV.
///
/// Response: `Content-Type: text/csv` with `Content-Disposition: attachment`.
#[tracing::instrument(skip(state))]
pub async fn export_directories(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(q): Query<ExportQuery>,
) -> Result<Response, AppError> {
    if let Some(ref fmt) = q.format {
        if fmt != "csv" {
            return Err(AppError::BadRequest(format!(
                "unsupported format: {fmt}; only 'csv' is supported"
            )));
        }
    }

    let depth = parse_depth(q.depth, state.config.default_depth)?;
    let snapshot = require_snapshot(&state, &property_id, Dimension::Page)?;
    let report = directory_report(&snapshot.rows, depth)?;

    let csv_bytes =
        Bytes::from(build_csv(&report).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?);
    let filename = format!(
        "directories-{}-{}-{}.csv",
        filename_safe(&property_id),
        snapshot.range.from,
        snapshot.range.to
    );

    build_csv_response(&filename, csv_bytes)
}

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps interpret values that begin with `=`, `+`, `-`, `@`, TAB,
/// or CR as formulas. A leading single quote makes them literal.
fn sanitize_csv_field(val: &str) -> std::borrow::Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        std::borrow::Cow::Owned(format!("'{val}"))
    } else {
        std::borrow::Cow::Borrowed(val)
    }
}

/// Property ids look like `sc-domain:example.com`; keep the header value plain.
fn filename_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

fn build_csv(rows: &[DirectoryAggregate]) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(rows.len().saturating_mul(64)));

    wtr.write_record([
        "path",
        "clicks",
        "impressions",
        "ctr",
        "position",
        "page_count",
    ])
    .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for row in rows {
        wtr.write_record([
            sanitize_csv_field(&row.path).into_owned(),
            row.clicks.to_string(),
            row.impressions.to_string(),
            format!("{:.4}", row.ctr),
            format!("{:.2}", row.position),
            row.page_count.to_string(),
        ])
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}

fn build_csv_response(filename: &str, csv_bytes: Bytes) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(path: &str, clicks: u64) -> DirectoryAggregate {
        DirectoryAggregate {
            path: path.to_string(),
            clicks,
            impressions: clicks * 10,
            ctr: 0.1,
            position: 3.25,
            page_count: 2,
            pages: Vec::new(),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let bytes = build_csv(&[dir("/de", 30), dir("/en", 5)]).expect("csv");
        let text = String::from_utf8(bytes).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "path,clicks,impressions,ctr,position,page_count");
        assert_eq!(lines[1], "/de,30,300,0.1000,3.25,2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn formula_like_paths_are_quoted() {
        assert_eq!(sanitize_csv_field("=cmd()"), "'=cmd()");
        assert_eq!(sanitize_csv_field("/de"), "/de");
    }

    #[test]
    fn filename_drops_separators() {
        assert_eq!(filename_safe("sc-domain:x.test/de"), "sc-domain_x.test_de");
    }
}
