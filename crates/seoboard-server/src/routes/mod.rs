pub mod backlinks;
pub mod date_range;
pub mod export;
pub mod health;
pub mod params;
pub mod properties;
pub mod rankings;
pub mod reports;
pub mod workload;

use std::borrow::Cow;

use seoboard_core::filter::BrandFilter;

use crate::state::AppState;

/// Brand terms sent with the request win over the configured ones.
pub(crate) fn brand_filter_for<'a>(
    state: &'a AppState,
    raw: Option<&str>,
) -> Cow<'a, BrandFilter> {
    match raw {
        Some(raw) => Cow::Owned(BrandFilter::parse(raw)),
        None => Cow::Borrowed(&state.brand_filter),
    }
}
