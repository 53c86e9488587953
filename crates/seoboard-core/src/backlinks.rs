//! Backlink table rows and the summary shown above the table.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::pager::{sort_by, SortDirection};
use crate::rollup::{rollup, sorted_by_count};

/// How many anchors the summary lists.
pub const TOP_ANCHORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklinkRow {
    pub source_url: String,
    pub target_url: String,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub domain_rating: Option<f64>,
    #[serde(default = "default_dofollow")]
    pub dofollow: bool,
    #[serde(default)]
    pub first_seen: Option<NaiveDate>,
}

fn default_dofollow() -> bool {
    true
}

impl BacklinkRow {
    /// Host of the linking page without a leading `www.`.
    pub fn source_domain(&self) -> Option<String> {
        let url = Url::parse(&self.source_url).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorCount {
    pub anchor: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklinkSummary {
    pub total: u64,
    pub dofollow: u64,
    pub nofollow: u64,
    pub referring_domains: u64,
    /// Mean over rows that carry a rating; 0 when none do.
    pub avg_domain_rating: f64,
    pub top_anchors: Vec<AnchorCount>,
}

pub fn summarize(backlinks: &[BacklinkRow]) -> BacklinkSummary {
    let dofollow = backlinks.iter().filter(|b| b.dofollow).count() as u64;
    let domains: HashSet<String> = backlinks
        .iter()
        .filter_map(BacklinkRow::source_domain)
        .collect();

    let mut ratings: Vec<f64> = backlinks
        .iter()
        .filter_map(|b| b.domain_rating)
        .filter(|r| r.is_finite())
        .collect();
    ratings.sort_by(f64::total_cmp);
    let avg_domain_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    let anchors = rollup(backlinks, |b| b.anchor.as_deref());
    let top_anchors = sorted_by_count(&anchors)
        .into_iter()
        .take(TOP_ANCHORS)
        .map(|(anchor, count)| AnchorCount { anchor, count })
        .collect();

    BacklinkSummary {
        total: backlinks.len() as u64,
        dofollow,
        nofollow: backlinks.len() as u64 - dofollow,
        referring_domains: domains.len() as u64,
        avg_domain_rating,
        top_anchors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacklinkSortKey {
    #[default]
    DomainRating,
    SourceUrl,
    Anchor,
    FirstSeen,
}

impl FromStr for BacklinkSortKey {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "domain_rating" => Ok(Self::DomainRating),
            "source_url" => Ok(Self::SourceUrl),
            "anchor" => Ok(Self::Anchor),
            "first_seen" => Ok(Self::FirstSeen),
            other => Err(CoreError::InvalidSortKey(other.to_string())),
        }
    }
}

pub fn sort_backlinks(rows: &mut [BacklinkRow], key: BacklinkSortKey, direction: SortDirection) {
    match key {
        BacklinkSortKey::DomainRating => sort_by(rows, |b| b.domain_rating, direction),
        BacklinkSortKey::SourceUrl => {
            sort_by(rows, |b| Some(b.source_url.to_lowercase()), direction)
        }
        BacklinkSortKey::Anchor => {
            sort_by(rows, |b| b.anchor.as_ref().map(|a| a.to_lowercase()), direction)
        }
        BacklinkSortKey::FirstSeen => sort_by(rows, |b| b.first_seen, direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::UNCATEGORIZED;

    fn link(
        source: &str,
        anchor: Option<&str>,
        rating: Option<f64>,
        dofollow: bool,
    ) -> BacklinkRow {
        BacklinkRow {
            source_url: source.to_string(),
            target_url: "https://x.test/".to_string(),
            anchor: anchor.map(str::to_string),
            domain_rating: rating,
            dofollow,
            first_seen: None,
        }
    }

    #[test]
    fn summary_counts_domains_and_follow_split() {
        let rows = vec![
            link("https://www.blog.test/post-1", Some("acme"), Some(40.0), true),
            link("https://blog.test/post-2", Some("acme"), Some(60.0), false),
            link("https://news.test/a", None, None, true),
            link("not a url", Some("click here"), None, true),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.dofollow, 3);
        assert_eq!(summary.nofollow, 1);
        assert_eq!(summary.referring_domains, 2);
        assert_eq!(summary.avg_domain_rating, 50.0);
        assert_eq!(
            summary.top_anchors[0],
            AnchorCount {
                anchor: "acme".to_string(),
                count: 2
            }
        );
        assert!(summary.top_anchors.iter().any(|a| a.anchor == UNCATEGORIZED));
    }

    #[test]
    fn empty_backlinks_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_domain_rating, 0.0);
        assert!(summary.top_anchors.is_empty());
    }

    #[test]
    fn unrated_links_sort_last() {
        let mut rows = vec![
            link("https://a.test", None, None, true),
            link("https://b.test", None, Some(10.0), true),
            link("https://c.test", None, Some(70.0), true),
        ];
        sort_backlinks(&mut rows, BacklinkSortKey::DomainRating, SortDirection::Desc);
        let order: Vec<&str> = rows.iter().map(|r| r.source_url.as_str()).collect();
        assert_eq!(order, vec!["https://c.test", "https://b.test", "https://a.test"]);
    }
}
