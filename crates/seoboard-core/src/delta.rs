//! Period-over-period differences.
//!
//! Every metric is reported as a plain signed `current - previous`. A falling
//! position is an improvement, so callers rendering trend arrows flip the
//! sign for `position` themselves; nothing here encodes good or bad.

use serde::{Deserialize, Serialize};

use crate::metrics::PeriodTotals;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

pub fn delta(current: &PeriodTotals, previous: &PeriodTotals) -> Delta {
    Delta {
        clicks: current.clicks - previous.clicks,
        impressions: current.impressions - previous.impressions,
        ctr: current.ctr - previous.ctr,
        position: current.position - previous.position,
    }
}

/// Relative change as a fraction (`0.25` means +25 %).
///
/// `None` when the previous value is zero and the current one is not.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        if current == 0.0 {
            Some(0.0)
        } else {
            None
        }
    } else {
        Some((current - previous) / previous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaValue {
    pub current: f64,
    pub previous: f64,
    pub delta_abs: f64,
    pub delta_pct: Option<f64>,
}

impl DeltaValue {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            delta_abs: current - previous,
            delta_pct: percent_change(current, previous),
        }
    }
}

/// Everything the overview cards need for one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub delta: Delta,
    pub clicks: DeltaValue,
    pub impressions: DeltaValue,
    pub ctr: DeltaValue,
    pub position: DeltaValue,
}

pub fn compare(current: PeriodTotals, previous: PeriodTotals) -> PeriodComparison {
    PeriodComparison {
        delta: delta(&current, &previous),
        clicks: DeltaValue::new(current.clicks, previous.clicks),
        impressions: DeltaValue::new(current.impressions, previous.impressions),
        ctr: DeltaValue::new(current.ctr, previous.ctr),
        position: DeltaValue::new(current.position, previous.position),
        current,
        previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clicks(value: f64) -> PeriodTotals {
        PeriodTotals {
            clicks: value,
            ..PeriodTotals::default()
        }
    }

    #[test]
    fn delta_is_current_minus_previous() {
        assert_eq!(delta(&clicks(100.0), &clicks(80.0)).clicks, 20.0);
        assert_eq!(delta(&clicks(80.0), &clicks(100.0)).clicks, -20.0);
    }

    #[test]
    fn position_delta_is_not_inverted() {
        let current = PeriodTotals {
            position: 4.0,
            ..PeriodTotals::default()
        };
        let previous = PeriodTotals {
            position: 7.5,
            ..PeriodTotals::default()
        };
        // Moved up the results page, reported as a plain negative difference.
        assert_eq!(delta(&current, &previous).position, -3.5);
    }

    #[test]
    fn percent_change_handles_zero_previous() {
        assert_eq!(percent_change(0.0, 0.0), Some(0.0));
        assert_eq!(percent_change(5.0, 0.0), None);
        assert_eq!(percent_change(-5.0, 0.0), None);
        assert_eq!(percent_change(150.0, 100.0), Some(0.5));
        assert_eq!(percent_change(50.0, 100.0), Some(-0.5));
    }

    #[test]
    fn comparison_carries_all_metrics() {
        let current = PeriodTotals {
            clicks: 120.0,
            impressions: 1000.0,
            ctr: 0.12,
            position: 5.0,
        };
        let previous = PeriodTotals {
            clicks: 0.0,
            impressions: 800.0,
            ctr: 0.0,
            position: 6.0,
        };
        let cmp = compare(current, previous);
        assert_eq!(cmp.clicks.delta_pct, None);
        assert_eq!(cmp.impressions.delta_pct, Some(0.25));
        assert_eq!(cmp.position.delta_abs, -1.0);
        assert_eq!(cmp.delta.impressions, 200.0);

        let json = serde_json::to_value(&cmp).expect("json");
        assert!(json["clicks"]["delta_pct"].is_null());
    }
}
