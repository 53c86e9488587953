//! Additive metric rows and the aggregator shared by every report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One row of a Search Console breakdown.
///
/// `key` is a page URL, query string, country code or device label depending
/// on the dimension the snapshot was requested with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(alias = "dimensionKey")]
    pub key: String,
    pub clicks: u64,
    pub impressions: u64,
    /// As delivered upstream. Never read when re-aggregating.
    #[serde(default)]
    pub ctr: f64,
    pub position: f64,
}

impl MetricRow {
    pub fn new(key: impl Into<String>, clicks: u64, impressions: u64, position: f64) -> Self {
        Self {
            key: key.into(),
            clicks,
            impressions,
            ctr: ratio(clicks, impressions),
            position,
        }
    }

    /// Reject rows whose numbers cannot come from a real report.
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.ctr.is_finite() || !(0.0..=1.0).contains(&self.ctr) {
            Some(format!("ctr {} outside [0, 1]", self.ctr))
        } else if !self.position.is_finite() || self.position < 0.0 {
            Some(format!("position {} is not a non-negative number", self.position))
        } else if self.clicks > self.impressions {
            Some(format!(
                "clicks ({}) exceed impressions ({})",
                self.clicks, self.impressions
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidRow {
                key: self.key.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Result of folding a group of rows together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSummary {
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    /// Unweighted mean of member positions.
    pub position: f64,
    pub count: usize,
}

/// Fold `rows` into a single summary.
///
/// Sums saturate at `u64::MAX`.
///
/// CTR is recomputed from the summed clicks and impressions rather than
/// averaged from the per-row values. Position is a flat arithmetic mean
/// across rows, not weighted by impressions; every report has always
/// presented it that way and changing it would shift historic numbers.
pub fn aggregate<'a, I>(rows: I) -> MetricSummary
where
    I: IntoIterator<Item = &'a MetricRow>,
{
    let mut clicks = 0u64;
    let mut impressions = 0u64;
    let mut positions = Vec::new();

    for row in rows {
        clicks = clicks.saturating_add(row.clicks);
        impressions = impressions.saturating_add(row.impressions);
        positions.push(row.position);
    }

    MetricSummary {
        clicks,
        impressions,
        ctr: ratio(clicks, impressions),
        position: mean(&mut positions),
        count: positions.len(),
    }
}

/// `clicks / impressions`, or 0 when nothing was shown.
pub fn ratio(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        0.0
    } else {
        clicks as f64 / impressions as f64
    }
}

// Sorted before summing so the float result does not depend on row order.
fn mean(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Period-level totals as shown on the overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

impl From<&MetricSummary> for PeriodTotals {
    fn from(summary: &MetricSummary) -> Self {
        Self {
            clicks: summary.clicks as f64,
            impressions: summary.impressions as f64,
            ctr: summary.ctr,
            position: summary.position,
        }
    }
}

impl PeriodTotals {
    pub fn from_rows(rows: &[MetricRow]) -> Self {
        Self::from(&aggregate(rows))
    }
}

/// A re-aggregated row of a query, country or device table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionRow {
    pub key: String,
    #[serde(flatten)]
    pub metrics: MetricSummary,
}

/// Merge rows sharing the same key and order them by clicks, highest first.
///
/// Upstream exports split by date or search appearance repeat keys; the
/// tables want one line per key.
pub fn dimension_report(rows: &[MetricRow]) -> Vec<DimensionRow> {
    let mut by_key: HashMap<&str, Vec<&MetricRow>> = HashMap::new();
    for row in rows {
        by_key.entry(row.key.as_str()).or_default().push(row);
    }

    let mut report: Vec<DimensionRow> = by_key
        .into_iter()
        .map(|(key, members)| DimensionRow {
            key: key.to_string(),
            metrics: aggregate(members),
        })
        .collect();
    report.sort_by(|a, b| {
        b.metrics
            .clicks
            .cmp(&a.metrics.clicks)
            .then_with(|| a.key.cmp(&b.key))
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctr_is_weighted_by_impressions_not_averaged() {
        let rows = vec![
            MetricRow::new("a", 10, 1000, 4.0), // ctr 0.01
            MetricRow::new("b", 5, 10, 2.0),    // ctr 0.5
        ];
        let summary = aggregate(&rows);
        let naive_mean = (rows[0].ctr + rows[1].ctr) / 2.0;

        assert!((summary.ctr - 15.0 / 1010.0).abs() < 1e-12);
        assert!((summary.ctr - naive_mean).abs() > 0.1);
    }

    #[test]
    fn stored_ctr_is_ignored() {
        let mut row = MetricRow::new("a", 10, 100, 3.0);
        row.ctr = 0.9;
        assert!((aggregate([&row]).ctr - 0.1).abs() < 1e-12);
    }

    #[test]
    fn position_is_flat_mean() {
        let rows = vec![
            MetricRow::new("a", 100, 1000, 2.0),
            MetricRow::new("b", 0, 1, 10.0),
        ];
        assert_eq!(aggregate(&rows).position, 6.0);
    }

    #[test]
    fn oversized_sums_saturate() {
        let rows = vec![
            MetricRow::new("a", u64::MAX - 1, u64::MAX, 1.0),
            MetricRow::new("b", 5, u64::MAX, 3.0),
        ];
        let summary = aggregate(&rows);
        assert_eq!(summary.clicks, u64::MAX);
        assert_eq!(summary.impressions, u64::MAX);
        assert_eq!(summary.count, 2);
        assert!(summary.ctr <= 1.0);
    }

    #[test]
    fn empty_input_degenerates_to_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary, MetricSummary::default());
    }

    #[test]
    fn zero_impressions_gives_zero_ctr() {
        let rows = vec![MetricRow::new("a", 0, 0, 12.0)];
        let summary = aggregate(&rows);
        assert_eq!(summary.ctr, 0.0);
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn aggregate_is_order_independent() {
        let rows: Vec<MetricRow> = (1..=50)
            .map(|i| MetricRow::new(format!("k{i}"), i, i * 7, 1.0 + (i as f64) * 0.37))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut shuffled = rows.clone();
        shuffled.rotate_left(17);

        let a = aggregate(&rows);
        assert_eq!(a, aggregate(&reversed));
        assert_eq!(a, aggregate(&shuffled));
    }

    #[test]
    fn dimension_report_merges_duplicate_keys() {
        let rows = vec![
            MetricRow::new("shoes", 3, 30, 4.0),
            MetricRow::new("boots", 10, 40, 2.0),
            MetricRow::new("shoes", 9, 70, 6.0),
        ];
        let report = dimension_report(&rows);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].key, "shoes");
        assert_eq!(report[0].metrics.clicks, 12);
        assert_eq!(report[0].metrics.impressions, 100);
        assert_eq!(report[0].metrics.position, 5.0);
        assert_eq!(report[1].key, "boots");
    }

    #[test]
    fn validate_rejects_impossible_rows() {
        assert!(MetricRow::new("ok", 1, 10, 3.0).validate().is_ok());

        let mut bad_ctr = MetricRow::new("x", 1, 10, 3.0);
        bad_ctr.ctr = 1.5;
        assert!(bad_ctr.validate().is_err());

        let bad_position = MetricRow::new("x", 1, 10, f64::NAN);
        assert!(bad_position.validate().is_err());

        let too_many_clicks = MetricRow::new("x", 11, 10, 3.0);
        assert!(matches!(
            too_many_clicks.validate(),
            Err(CoreError::InvalidRow { .. })
        ));
    }

    #[test]
    fn deserializes_dimension_key_alias() {
        let row: MetricRow = serde_json::from_str(
            r#"{"dimensionKey":"https://x.test/a","clicks":1,"impressions":2,"position":3.5}"#,
        )
        .expect("row");
        assert_eq!(row.key, "https://x.test/a");
        assert_eq!(row.ctr, 0.0);
    }
}
