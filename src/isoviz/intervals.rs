//! Calendar interval keys and interval completion
//!
//! Interval keys are calendar buckets at year (`YYYY`), month (`YYYY-MM`) or
//! day (`YYYY-MM-DD`) granularity. Completion makes every series cover the
//! same contiguous range of buckets, filling gaps with zero.

use super::ingest::RawSeriesTable;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Granularity of an interval key, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    Year,
    Month,
    Day,
}

/// A calendar-aligned interval
///
/// Ordering matches the lexical order of the zero-padded string form for
/// keys of the same granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalKey {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl IntervalKey {
    pub fn year(year: i32) -> Self {
        IntervalKey {
            year,
            month: None,
            day: None,
        }
    }

    /// Month key; None if the month is out of range
    pub fn month(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(IntervalKey {
            year,
            month: Some(month),
            day: None,
        })
    }

    /// Day key; None if the date does not exist
    pub fn day(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|_| IntervalKey {
            year,
            month: Some(month),
            day: Some(day),
        })
    }

    /// Parse a zero-padded key (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`)
    pub fn parse(key: &str) -> Option<Self> {
        let parts: Vec<&str> = key.split('-').collect();
        let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

        match parts.as_slice() {
            [y] if digits(y, 4) => Some(Self::year(y.parse().ok()?)),
            [y, m] if digits(y, 4) && digits(m, 2) => {
                Self::month(y.parse().ok()?, m.parse().ok()?)
            }
            [y, m, d] if digits(y, 4) && digits(m, 2) && digits(d, 2) => {
                Self::day(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
            }
            _ => None,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match (self.month, self.day) {
            (None, _) => Granularity::Year,
            (Some(_), None) => Granularity::Month,
            (Some(_), Some(_)) => Granularity::Day,
        }
    }

    /// Truncate to a coarser granularity (no-op if already as coarse)
    pub fn truncate(&self, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Year => Self::year(self.year),
            Granularity::Month => IntervalKey {
                day: None,
                ..*self
            },
            Granularity::Day => *self,
        }
    }

    pub fn year_value(&self) -> i32 {
        self.year
    }

    pub fn month_value(&self) -> Option<u32> {
        self.month
    }

    pub fn day_value(&self) -> Option<u32> {
        self.day
    }

    /// The following calendar unit at this key's granularity
    fn next(&self) -> Self {
        match (self.month, self.day) {
            (None, _) => Self::year(self.year + 1),
            (Some(12), None) => IntervalKey {
                year: self.year + 1,
                month: Some(1),
                day: None,
            },
            (Some(m), None) => IntervalKey {
                month: Some(m + 1),
                ..*self
            },
            (Some(m), Some(d)) => {
                if d < days_in_month(self.year, m) {
                    IntervalKey {
                        day: Some(d + 1),
                        ..*self
                    }
                } else if m < 12 {
                    IntervalKey {
                        year: self.year,
                        month: Some(m + 1),
                        day: Some(1),
                    }
                } else {
                    IntervalKey {
                        year: self.year + 1,
                        month: Some(1),
                        day: Some(1),
                    }
                }
            }
        }
    }
}

impl fmt::Display for IntervalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        Ok(())
    }
}

/// Number of days in a month (Gregorian, leap years included)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Every calendar unit from `first` to `last`, inclusive
///
/// Both keys must share a granularity. Interior years span all twelve months
/// and interior months all of their days; only the ends are clamped to the
/// observed values.
pub fn calendar_range(first: IntervalKey, last: IntervalKey) -> Vec<IntervalKey> {
    debug_assert_eq!(first.granularity(), last.granularity());

    let mut range = Vec::new();
    let mut current = first;
    while current <= last {
        range.push(current);
        current = current.next();
    }
    range
}

/// One graph: a label plus one value per interval of the shared axis
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

impl Series {
    /// Largest absolute value, 0 for an all-zero series
    pub fn magnitude_limit(&self) -> f64 {
        self.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Completed, immutable table of series on one contiguous interval axis
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    granularity: Granularity,
    axis: Vec<IntervalKey>,
    series: Vec<Series>,
}

impl SeriesTable {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The shared, ascending interval axis
    pub fn axis(&self) -> &[IntervalKey] {
        &self.axis
    }

    /// Interval axis as zero-padded strings
    pub fn axis_keys(&self) -> Vec<String> {
        self.axis.iter().map(|k| k.to_string()).collect()
    }

    /// Series in input (first appearance) order
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn get(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Largest absolute value over all series
    pub fn global_limit(&self) -> f64 {
        self.series
            .iter()
            .map(Series::magnitude_limit)
            .fold(0.0_f64, f64::max)
    }
}

/// Fill every series so it covers the full calendar range of the input
///
/// Returns None if the input has no interval keys at all.
///
/// Mixed granularities are coerced to the coarsest one present: finer keys
/// are truncated and their values summed into the coarser bucket.
pub fn complete(raw: RawSeriesTable) -> Option<SeriesTable> {
    let granularity = raw
        .series
        .iter()
        .flat_map(|(_, values)| values.keys())
        .map(IntervalKey::granularity)
        .min()?;

    let mut mixed = 0usize;
    let coerced: Vec<(String, BTreeMap<IntervalKey, f64>)> = raw
        .series
        .into_iter()
        .map(|(label, values)| {
            let mut buckets = BTreeMap::new();
            for (key, value) in values {
                if key.granularity() != granularity {
                    mixed += 1;
                }
                *buckets.entry(key.truncate(granularity)).or_insert(0.0) += value;
            }
            (label, buckets)
        })
        .collect();

    if mixed > 0 {
        tracing::warn!(
            "{} interval(s) finer than {:?} granularity were merged into {:?} buckets",
            mixed,
            granularity,
            granularity
        );
    }

    let first = coerced
        .iter()
        .filter_map(|(_, values)| values.keys().next())
        .min()
        .copied()?;
    let last = coerced
        .iter()
        .filter_map(|(_, values)| values.keys().next_back())
        .max()
        .copied()?;

    let axis = calendar_range(first, last);
    let series = coerced
        .into_iter()
        .map(|(label, values)| Series {
            values: axis
                .iter()
                .map(|key| values.get(key).copied().unwrap_or(0.0))
                .collect(),
            label,
        })
        .collect();

    Some(SeriesTable {
        granularity,
        axis,
        series,
    })
}
