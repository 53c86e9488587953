//! Query-parameter parsing shared by the report routes.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use seoboard_core::date_range::{resolve, DateRange, DateRangePreset};
use seoboard_core::directory::MAX_DEPTH;
use seoboard_core::pager::{Page, SortDirection, DEFAULT_PAGE_SIZE};
use seoboard_core::snapshot::Dimension;

use crate::error::AppError;

pub const MAX_PAGE_SIZE: usize = 200;

pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid {field} (expected YYYY-MM-DD)")))
}

/// Resolve `preset` (default `current_month`) plus optional custom bounds.
pub fn resolve_range(
    preset: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<(DateRangePreset, DateRange), AppError> {
    let preset = match preset {
        Some(raw) => raw.parse::<DateRangePreset>()?,
        None if from.is_some() || to.is_some() => DateRangePreset::Custom,
        None => DateRangePreset::default(),
    };
    let from = from.map(|raw| parse_date(raw, "from")).transpose()?;
    let to = to.map(|raw| parse_date(raw, "to")).transpose()?;
    Ok((preset, resolve(preset, today, from, to)?))
}

pub fn parse_depth(raw: Option<usize>, default: usize) -> Result<usize, AppError> {
    let depth = raw.unwrap_or(default);
    if !(1..=MAX_DEPTH).contains(&depth) {
        return Err(AppError::BadRequest(format!(
            "depth must be between 1 and {MAX_DEPTH}"
        )));
    }
    Ok(depth)
}

pub fn parse_dimension(raw: Option<&str>) -> Result<Dimension, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("page") => Ok(Dimension::Page),
        Some("query") => Ok(Dimension::Query),
        Some("country") => Ok(Dimension::Country),
        Some("device") => Ok(Dimension::Device),
        Some(other) => Err(AppError::BadRequest(format!(
            "dimension must be one of: page, query, country, device (got {other})"
        ))),
    }
}

pub fn parse_direction(
    raw: Option<&str>,
    default: SortDirection,
) -> Result<SortDirection, AppError> {
    raw.map(str::parse::<SortDirection>)
        .transpose()
        .map(|d| d.unwrap_or(default))
        .map_err(AppError::from)
}

/// Page number and size with defaults; sizes above [`MAX_PAGE_SIZE`] are
/// capped. Zero values are passed through so the pager rejects them.
pub fn page_params(page: Option<usize>, page_size: Option<usize>) -> (usize, usize) {
    (
        page.unwrap_or(1),
        page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
    )
}

pub fn pagination_json<T: Serialize>(page: &Page<T>) -> Value {
    json!({
        "page": page.page,
        "page_size": page.page_size,
        "total_items": page.total_items,
        "total_pages": page.total_pages,
        "has_more": page.page < page.total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 18).expect("date")
    }

    #[test]
    fn explicit_bounds_imply_custom() {
        let (preset, range) =
            resolve_range(None, Some("2026-01-01"), Some("2026-01-31"), today()).expect("range");
        assert_eq!(preset, DateRangePreset::Custom);
        assert_eq!(range.days(), 31);
    }

    #[test]
    fn invalid_inputs_are_bad_requests() {
        assert!(matches!(
            resolve_range(Some("fortnight"), None, None, today()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve_range(Some("custom"), Some("bad"), Some("2026-01-01"), today()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(parse_depth(Some(0), 1), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_depth(Some(6), 1), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_dimension(Some("browser")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(page_params(None, Some(10_000)), (1, MAX_PAGE_SIZE));
        assert_eq!(page_params(Some(0), Some(0)), (0, 0));
    }
}
