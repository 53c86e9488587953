//! Directory rollups: GSC page rows grouped by a truncated URL path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CoreError, Result};
use crate::metrics::{aggregate, MetricRow};

/// Deepest directory level the dashboard offers.
pub const MAX_DEPTH: usize = 5;

/// Path assigned to rows whose key does not parse as a URL.
pub const ROOT_PATH: &str = "/";

/// First `depth` non-empty path segments of `raw`, joined with a leading `/`.
///
/// Keys that are not absolute URLs land on [`ROOT_PATH`] so they still count
/// toward the totals.
pub fn truncated_path(raw: &str, depth: usize) -> String {
    let Ok(url) = Url::parse(raw) else {
        return ROOT_PATH.to_string();
    };
    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .take(depth)
        .collect();
    format!("/{}", segments.join("/"))
}

/// Bucket rows by [`truncated_path`]. Group order is unspecified.
pub fn group_by_path(
    rows: &[MetricRow],
    depth: usize,
) -> Result<HashMap<String, Vec<MetricRow>>> {
    if depth < 1 {
        return Err(CoreError::InvalidDepth(depth));
    }
    let mut groups: HashMap<String, Vec<MetricRow>> = HashMap::new();
    for row in rows {
        groups
            .entry(truncated_path(&row.key, depth))
            .or_default()
            .push(row.clone());
    }
    Ok(groups)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub url: String,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryAggregate {
    pub path: String,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
    pub page_count: usize,
    /// Member pages, most clicks first.
    pub pages: Vec<PageMetrics>,
}

impl DirectoryAggregate {
    fn from_group(path: String, rows: Vec<MetricRow>) -> Self {
        let summary = aggregate(&rows);
        let mut pages: Vec<PageMetrics> = rows
            .into_iter()
            .map(|row| PageMetrics {
                ctr: crate::metrics::ratio(row.clicks, row.impressions),
                url: row.key,
                clicks: row.clicks,
                impressions: row.impressions,
                position: row.position,
            })
            .collect();
        pages.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.url.cmp(&b.url)));

        Self {
            path,
            clicks: summary.clicks,
            impressions: summary.impressions,
            ctr: summary.ctr,
            position: summary.position,
            page_count: summary.count,
            pages,
        }
    }
}

/// Group, aggregate and order directories by clicks (ties by path).
pub fn directory_report(rows: &[MetricRow], depth: usize) -> Result<Vec<DirectoryAggregate>> {
    let mut report: Vec<DirectoryAggregate> = group_by_path(rows, depth)?
        .into_iter()
        .map(|(path, members)| DirectoryAggregate::from_group(path, members))
        .collect();
    report.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.path.cmp(&b.path)));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, clicks: u64, impressions: u64, position: f64) -> MetricRow {
        MetricRow::new(key, clicks, impressions, position)
    }

    #[test]
    fn truncates_to_requested_depth() {
        let url = "https://x.test/a/b/c/d";
        assert_eq!(truncated_path(url, 1), "/a");
        assert_eq!(truncated_path(url, 2), "/a/b");
        assert_eq!(truncated_path(url, 5), "/a/b/c/d");
    }

    #[test]
    fn short_paths_are_not_padded() {
        assert_eq!(truncated_path("https://x.test/a", 3), "/a");
        assert_eq!(truncated_path("https://x.test/", 2), "/");
        assert_eq!(truncated_path("https://x.test", 2), "/");
    }

    #[test]
    fn empty_segments_and_queries_are_ignored() {
        assert_eq!(truncated_path("https://x.test//de///shop/?q=1#top", 2), "/de/shop");
    }

    #[test]
    fn malformed_urls_fall_back_to_root() {
        let rows = vec![row("not a url", 1, 2, 3.0), row("/relative/path", 4, 5, 6.0)];
        let groups = group_by_path(&rows, 2).expect("groups");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[ROOT_PATH].len(), 2);
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert_eq!(group_by_path(&[], 0), Err(CoreError::InvalidDepth(0)));
    }

    #[test]
    fn grouping_preserves_totals() {
        let rows = vec![
            row("https://x.test/de/a/1", 10, 100, 3.0),
            row("https://x.test/de/b", 7, 70, 5.0),
            row("https://x.test/en/a", 4, 90, 8.0),
            row("https://x.test/", 2, 20, 1.0),
            row("garbage", 1, 3, 40.0),
        ];
        for depth in 1..=MAX_DEPTH {
            let groups = group_by_path(&rows, depth).expect("groups");
            let clicks: u64 = groups.values().flatten().map(|r| r.clicks).sum();
            let impressions: u64 = groups.values().flatten().map(|r| r.impressions).sum();
            let members: usize = groups.values().map(Vec::len).sum();
            assert_eq!(clicks, 24);
            assert_eq!(impressions, 283);
            assert_eq!(members, rows.len());
        }
    }

    #[test]
    fn single_directory_report() {
        let rows = vec![
            row("https://x.test/de/a", 10, 100, 5.0),
            row("https://x.test/de/b", 5, 50, 8.0),
        ];
        let report = directory_report(&rows, 1).expect("report");
        assert_eq!(report.len(), 1);

        let dir = &report[0];
        assert_eq!(dir.path, "/de");
        assert_eq!(dir.clicks, 15);
        assert_eq!(dir.impressions, 150);
        assert!((dir.ctr - 0.1).abs() < 1e-12);
        assert_eq!(dir.position, 6.5);
        assert_eq!(dir.page_count, 2);
        assert_eq!(dir.pages[0].url, "https://x.test/de/a");
        assert_eq!(dir.pages[1].url, "https://x.test/de/b");
    }

    #[test]
    fn directories_are_ordered_by_clicks() {
        let rows = vec![
            row("https://x.test/blog/x", 3, 30, 9.0),
            row("https://x.test/shop/y", 30, 300, 2.0),
            row("https://x.test/help/z", 3, 10, 4.0),
        ];
        let paths: Vec<String> = directory_report(&rows, 1)
            .expect("report")
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec!["/shop", "/blog", "/help"]);
    }
}
