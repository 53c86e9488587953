//! Categorical rollups for the reporting pages: tasks and tickets by status
//! or priority, workload per assignee, maturity model categories.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bucket for items that carry no category. Shown to users, so it is not
/// an internal marker.
pub const UNCATEGORIZED: &str = "Keine Kategorie";

/// Bucket for work items without an assignee.
pub const UNASSIGNED: &str = "Nicht zugewiesen";

/// Days after `now` that still count as "upcoming".
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

const CLOSED_STATUSES: &[&str] = &["done", "closed"];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryCount {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_counts: Option<BTreeMap<String, u64>>,
}

fn label<'a>(key: Option<&'a str>, fallback: &'a str) -> &'a str {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => k,
        _ => fallback,
    }
}

/// Count items per `key_fn`. Items without a key are counted under
/// [`UNCATEGORIZED`] so totals always add up.
pub fn rollup<'a, T, F>(items: &'a [T], key_fn: F) -> BTreeMap<String, CategoryCount>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut out: BTreeMap<String, CategoryCount> = BTreeMap::new();
    for item in items {
        out.entry(label(key_fn(item), UNCATEGORIZED).to_string())
            .or_default()
            .count += 1;
    }
    out
}

/// Two-level rollup: count per `key_fn`, then per `sub_key_fn` inside each.
pub fn rollup_nested<'a, T, F, G>(
    items: &'a [T],
    key_fn: F,
    sub_key_fn: G,
) -> BTreeMap<String, CategoryCount>
where
    F: Fn(&'a T) -> Option<&'a str>,
    G: Fn(&'a T) -> Option<&'a str>,
{
    let mut out: BTreeMap<String, CategoryCount> = BTreeMap::new();
    for item in items {
        let entry = out
            .entry(label(key_fn(item), UNCATEGORIZED).to_string())
            .or_default();
        entry.count += 1;
        *entry
            .sub_counts
            .get_or_insert_with(BTreeMap::new)
            .entry(label(sub_key_fn(item), UNCATEGORIZED).to_string())
            .or_default() += 1;
    }
    out
}

/// `(key, count)` pairs ordered for display: count descending, then key.
pub fn sorted_by_count(rollup: &BTreeMap<String, CategoryCount>) -> Vec<(String, u64)> {
    let mut pairs: Vec<(String, u64)> = rollup
        .iter()
        .map(|(key, stat)| (key.clone(), stat.count))
        .collect();
    // BTreeMap iteration is already key-ordered and sort_by is stable.
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs
}

/// A task or ticket as far as the reports are concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl WorkItem {
    pub fn is_open(&self) -> bool {
        !CLOSED_STATUSES
            .iter()
            .any(|closed| self.status.trim().eq_ignore_ascii_case(closed))
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date.is_some_and(|due| due < now)
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
        self.is_open()
            && self
                .due_date
                .is_some_and(|due| now <= due && due <= horizon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DueWindows {
    pub overdue: u64,
    pub upcoming: u64,
}

/// Overdue and upcoming counts relative to the caller's `now`.
pub fn due_windows(items: &[WorkItem], now: DateTime<Utc>) -> DueWindows {
    items.iter().fold(DueWindows::default(), |mut acc, item| {
        if item.is_overdue(now) {
            acc.overdue += 1;
        } else if item.is_upcoming(now) {
            acc.upcoming += 1;
        }
        acc
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkloadStat {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub overdue: u64,
    pub upcoming: u64,
}

/// Workload per assignee: status breakdown plus due-date windows.
pub fn workload_by_assignee(
    items: &[WorkItem],
    now: DateTime<Utc>,
) -> BTreeMap<String, WorkloadStat> {
    let mut out: BTreeMap<String, WorkloadStat> = BTreeMap::new();
    for item in items {
        let stat = out
            .entry(label(item.assignee.as_deref(), UNASSIGNED).to_string())
            .or_default();
        stat.total += 1;
        *stat
            .by_status
            .entry(label(Some(item.status.as_str()), UNCATEGORIZED).to_string())
            .or_default() += 1;
        if item.is_overdue(now) {
            stat.overdue += 1;
        } else if item.is_upcoming(now) {
            stat.upcoming += 1;
        }
    }
    out
}

/// One criterion of a maturity model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityItem {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub linked_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityCategoryStat {
    pub category: String,
    pub items: u64,
    /// Total linked tasks/tickets across the category's criteria.
    pub linked: u64,
    /// Mean of the scored criteria; 0 when none are scored.
    pub average_score: f64,
}

pub fn maturity_rollup(items: &[MaturityItem]) -> Vec<MaturityCategoryStat> {
    let mut acc: BTreeMap<&str, (u64, u64, Vec<f64>)> = BTreeMap::new();
    for item in items {
        let entry = acc
            .entry(label(item.category.as_deref(), UNCATEGORIZED))
            .or_default();
        entry.0 += 1;
        entry.1 += item.linked_items.len() as u64;
        if let Some(score) = item.score.filter(|s| s.is_finite()) {
            entry.2.push(score);
        }
    }

    acc.into_iter()
        .map(|(category, (count, linked, mut scores))| {
            scores.sort_by(f64::total_cmp);
            let average_score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            MaturityCategoryStat {
                category: category.to_string(),
                items: count,
                linked,
                average_score,
            }
        })
        .collect()
}
