//! Keyword rank tracking: position tiers and movement between snapshots.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pager::{sort_by, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Top3,
    /// Positions 4 to 10.
    Top10,
    Top20,
    Top50,
    Top100,
    NotRanking,
}

impl Tier {
    /// Display order, best first.
    pub const ALL: [Tier; 6] = [
        Tier::Top3,
        Tier::Top10,
        Tier::Top20,
        Tier::Top50,
        Tier::Top100,
        Tier::NotRanking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Top3 => "top3",
            Tier::Top10 => "top10",
            Tier::Top20 => "top20",
            Tier::Top50 => "top50",
            Tier::Top100 => "top100",
            Tier::NotRanking => "not_ranking",
        }
    }
}

/// Each tier's range is closed on its upper bound: 3 is top3, 3.01 is top10.
pub fn classify(position: Option<f64>) -> Tier {
    match position {
        None => Tier::NotRanking,
        Some(p) if p.is_nan() => Tier::NotRanking,
        Some(p) if p <= 3.0 => Tier::Top3,
        Some(p) if p <= 10.0 => Tier::Top10,
        Some(p) if p <= 20.0 => Tier::Top20,
        Some(p) if p <= 50.0 => Tier::Top50,
        Some(p) if p <= 100.0 => Tier::Top100,
        Some(_) => Tier::NotRanking,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Improved,
    Declined,
    Unchanged,
}

/// Compare two tracked positions. Lower is better.
///
/// A keyword that starts ranking counts as improved and one that drops out
/// counts as declined.
pub fn classify_movement(current: Option<f64>, previous: Option<f64>) -> Movement {
    match (current, previous) {
        (None, None) => Movement::Unchanged,
        (Some(_), None) => Movement::Improved,
        (None, Some(_)) => Movement::Declined,
        (Some(c), Some(p)) if c < p => Movement::Improved,
        (Some(c), Some(p)) if c > p => Movement::Declined,
        (Some(_), Some(_)) => Movement::Unchanged,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedKeyword {
    pub id: String,
    pub keyword: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub current_position: Option<f64>,
    #[serde(default)]
    pub previous_position: Option<f64>,
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TrackedKeyword {
    pub fn tier(&self) -> Tier {
        classify(self.current_position)
    }

    pub fn movement(&self) -> Movement {
        classify_movement(self.current_position, self.previous_position)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingStats {
    pub total: u64,
    pub top3: u64,
    pub top10: u64,
    pub top20: u64,
    pub top50: u64,
    pub top100: u64,
    pub not_ranking: u64,
    /// Mean of the non-null current positions; 0 when nothing ranks.
    pub avg_position: f64,
    pub improved: u64,
    pub declined: u64,
    pub unchanged: u64,
}

impl RankingStats {
    pub fn count(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Top3 => self.top3,
            Tier::Top10 => self.top10,
            Tier::Top20 => self.top20,
            Tier::Top50 => self.top50,
            Tier::Top100 => self.top100,
            Tier::NotRanking => self.not_ranking,
        }
    }
}

pub fn ranking_stats(keywords: &[TrackedKeyword]) -> RankingStats {
    let mut stats = RankingStats::default();
    let mut positions = Vec::new();

    for keyword in keywords {
        stats.total += 1;
        match keyword.tier() {
            Tier::Top3 => stats.top3 += 1,
            Tier::Top10 => stats.top10 += 1,
            Tier::Top20 => stats.top20 += 1,
            Tier::Top50 => stats.top50 += 1,
            Tier::Top100 => stats.top100 += 1,
            Tier::NotRanking => stats.not_ranking += 1,
        }
        match keyword.movement() {
            Movement::Improved => stats.improved += 1,
            Movement::Declined => stats.declined += 1,
            Movement::Unchanged => stats.unchanged += 1,
        }
        if let Some(p) = keyword.current_position.filter(|p| p.is_finite()) {
            positions.push(p);
        }
    }

    if !positions.is_empty() {
        positions.sort_by(f64::total_cmp);
        stats.avg_position = positions.iter().sum::<f64>() / positions.len() as f64;
    }
    stats
}

/// Chart-ready `{ name, value }` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCount {
    pub name: String,
    pub value: u64,
}

pub fn tier_distribution(stats: &RankingStats) -> Vec<TierCount> {
    Tier::ALL
        .iter()
        .map(|tier| TierCount {
            name: tier.as_str().to_string(),
            value: stats.count(*tier),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSortKey {
    Keyword,
    #[default]
    Position,
    PreviousPosition,
    /// Positions gained since the previous snapshot.
    Change,
    SearchVolume,
}

impl FromStr for KeywordSortKey {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "keyword" => Ok(Self::Keyword),
            "position" => Ok(Self::Position),
            "previous_position" => Ok(Self::PreviousPosition),
            "change" => Ok(Self::Change),
            "search_volume" => Ok(Self::SearchVolume),
            other => Err(CoreError::InvalidSortKey(other.to_string())),
        }
    }
}

/// Sort the keyword table. Unranked keywords stay at the bottom either way.
pub fn sort_keywords(rows: &mut [TrackedKeyword], key: KeywordSortKey, direction: SortDirection) {
    match key {
        KeywordSortKey::Keyword => sort_by(rows, |k| Some(k.keyword.to_lowercase()), direction),
        KeywordSortKey::Position => sort_by(rows, |k| k.current_position, direction),
        KeywordSortKey::PreviousPosition => sort_by(rows, |k| k.previous_position, direction),
        KeywordSortKey::Change => sort_by(
            rows,
            |k| match (k.current_position, k.previous_position) {
                (Some(c), Some(p)) => Some(p - c),
                _ => None,
            },
            direction,
        ),
        KeywordSortKey::SearchVolume => sort_by(rows, |k| k.search_volume, direction),
    }
}
