//! Date-range presets offered by the dashboard filter bar.

use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Search Console keeps 16 months of history; "all" asks for that much.
pub const RETENTION_MONTHS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangePreset {
    #[default]
    CurrentMonth,
    LastMonth,
    LastQuarter,
    LastHalf,
    Ytd,
    LastYear,
    All,
    Custom,
}

impl FromStr for DateRangePreset {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim() {
            "current_month" => Ok(Self::CurrentMonth),
            "last_month" => Ok(Self::LastMonth),
            "last_quarter" => Ok(Self::LastQuarter),
            "last_half" => Ok(Self::LastHalf),
            "ytd" => Ok(Self::Ytd),
            "last_year" => Ok(Self::LastYear),
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            other => Err(CoreError::UnknownPreset(other.to_string())),
        }
    }
}

/// Inclusive `from..=to` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to < from {
            return Err(CoreError::InvalidDateRange(format!(
                "to ({to}) is before from ({from})"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// The window of equal length that ends the day before this one starts.
    ///
    /// Fails when that window would fall before the earliest representable
    /// date.
    pub fn previous_period(&self) -> Result<Self> {
        let out_of_range = || {
            CoreError::InvalidDateRange(format!(
                "no previous period before {} for a {}-day range",
                self.from,
                self.days()
            ))
        };
        let to = self
            .from
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        let from = to
            .checked_sub_signed(Duration::days(self.days() - 1))
            .ok_or_else(out_of_range)?;
        Ok(Self { from, to })
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CoreError::InvalidDateRange(format!("{year}-{month}-{day} is not a date")))
}

fn months_back(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(|| CoreError::InvalidDateRange(format!("{date} minus {months} months")))
}

/// Resolve a preset against `today`.
///
/// Rolling presets end on `today`; "last_*" presets cover the previous
/// complete calendar month, quarter, half-year or year. `custom` needs both
/// bounds.
pub fn resolve(
    preset: DateRangePreset,
    today: NaiveDate,
    custom_from: Option<NaiveDate>,
    custom_to: Option<NaiveDate>,
) -> Result<DateRange> {
    let year = today.year();
    let month_start = ymd(year, today.month(), 1)?;

    match preset {
        DateRangePreset::CurrentMonth => DateRange::new(month_start, today),
        DateRangePreset::LastMonth => {
            DateRange::new(months_back(month_start, 1)?, month_start - Duration::days(1))
        }
        DateRangePreset::LastQuarter => {
            let quarter_start = ymd(year, (today.month0() / 3) * 3 + 1, 1)?;
            DateRange::new(
                months_back(quarter_start, 3)?,
                quarter_start - Duration::days(1),
            )
        }
        DateRangePreset::LastHalf => {
            let half_start = ymd(year, if today.month() <= 6 { 1 } else { 7 }, 1)?;
            DateRange::new(months_back(half_start, 6)?, half_start - Duration::days(1))
        }
        DateRangePreset::Ytd => DateRange::new(ymd(year, 1, 1)?, today),
        DateRangePreset::LastYear => DateRange::new(ymd(year - 1, 1, 1)?, ymd(year - 1, 12, 31)?),
        DateRangePreset::All => DateRange::new(months_back(today, RETENTION_MONTHS)?, today),
        DateRangePreset::Custom => match (custom_from, custom_to) {
            (Some(from), Some(to)) => DateRange::new(from, to),
            _ => Err(CoreError::InvalidDateRange(
                "custom range requires both from and to".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn range(preset: DateRangePreset, today: NaiveDate) -> DateRange {
        resolve(preset, today, None, None).expect("range")
    }

    #[test]
    fn month_presets() {
        let today = date(2026, 3, 18);
        assert_eq!(
            range(DateRangePreset::CurrentMonth, today),
            DateRange { from: date(2026, 3, 1), to: today }
        );
        assert_eq!(
            range(DateRangePreset::LastMonth, today),
            DateRange { from: date(2026, 2, 1), to: date(2026, 2, 28) }
        );
        assert_eq!(
            range(DateRangePreset::LastMonth, date(2026, 1, 5)),
            DateRange { from: date(2025, 12, 1), to: date(2025, 12, 31) }
        );
    }

    #[test]
    fn quarter_and_half_presets() {
        assert_eq!(
            range(DateRangePreset::LastQuarter, date(2026, 5, 20)),
            DateRange { from: date(2026, 1, 1), to: date(2026, 3, 31) }
        );
        assert_eq!(
            range(DateRangePreset::LastQuarter, date(2026, 2, 1)),
            DateRange { from: date(2025, 10, 1), to: date(2025, 12, 31) }
        );
        assert_eq!(
            range(DateRangePreset::LastHalf, date(2026, 8, 2)),
            DateRange { from: date(2026, 1, 1), to: date(2026, 6, 30) }
        );
        assert_eq!(
            range(DateRangePreset::LastHalf, date(2026, 6, 30)),
            DateRange { from: date(2025, 7, 1), to: date(2025, 12, 31) }
        );
    }

    #[test]
    fn year_presets() {
        let today = date(2026, 10, 18);
        assert_eq!(
            range(DateRangePreset::Ytd, today),
            DateRange { from: date(2026, 1, 1), to: today }
        );
        assert_eq!(
            range(DateRangePreset::LastYear, today),
            DateRange { from: date(2025, 1, 1), to: date(2025, 12, 31) }
        );
        assert_eq!(
            range(DateRangePreset::All, today),
            DateRange { from: date(2025, 6, 18), to: today }
        );
    }

    #[test]
    fn custom_requires_valid_bounds() {
        let today = date(2026, 1, 1);
        assert!(resolve(DateRangePreset::Custom, today, Some(today), None).is_err());
        assert!(
            resolve(DateRangePreset::Custom, today, Some(date(2026, 2, 1)), Some(today)).is_err()
        );
        let ok = resolve(DateRangePreset::Custom, today, Some(date(2025, 12, 1)), Some(today))
            .expect("custom");
        assert_eq!(ok.days(), 32);
    }

    #[test]
    fn previous_period_has_equal_length() {
        let current = DateRange::new(date(2026, 2, 10), date(2026, 2, 20)).expect("range");
        let previous = current.previous_period().expect("previous");
        assert_eq!(previous.to, date(2026, 2, 9));
        assert_eq!(previous.from, date(2026, 1, 30));
        assert_eq!(previous.days(), current.days());
    }

    #[test]
    fn previous_period_before_earliest_date_is_an_error() {
        let earliest = DateRange::new(NaiveDate::MIN, NaiveDate::MIN).expect("range");
        assert!(matches!(
            earliest.previous_period(),
            Err(CoreError::InvalidDateRange(_))
        ));

        let near_min = NaiveDate::MIN + Duration::days(2);
        let wide = DateRange::new(near_min, near_min + Duration::days(10)).expect("range");
        assert!(wide.previous_period().is_err());
    }

    #[test]
    fn parses_presets() {
        assert_eq!("ytd".parse::<DateRangePreset>(), Ok(DateRangePreset::Ytd));
        assert_eq!(
            "last_week".parse::<DateRangePreset>(),
            Err(CoreError::UnknownPreset("last_week".to_string()))
        );
    }
}
