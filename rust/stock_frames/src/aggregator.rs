// src/aggregator.rs

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::FrameError;
use crate::normalizer::{self, ColumnKey, ColumnMap, NormalizedTable};
use crate::raw::{Field, Ticker};

/// Calendar month a trading date falls in, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FrameError::InvalidPeriod(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Any table whose rows can be truncated to a calendar month.
pub trait MonthKeyed {
    /// One month key per row, in row order.
    fn month_keys(&self) -> Vec<YearMonth>;

    fn value_columns(&self) -> &ColumnMap;
}

impl MonthKeyed for NormalizedTable {
    fn month_keys(&self) -> Vec<YearMonth> {
        self.dates().iter().map(|date| YearMonth::of(*date)).collect()
    }

    fn value_columns(&self) -> &ColumnMap {
        self.columns()
    }
}

impl MonthKeyed for MonthlyTable {
    fn month_keys(&self) -> Vec<YearMonth> {
        self.periods.clone()
    }

    fn value_columns(&self) -> &ColumnMap {
        &self.columns
    }
}

/// Monthly means of every column, one row per month present in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    periods: Vec<YearMonth>,
    columns: ColumnMap,
}

impl MonthlyTable {
    pub fn periods(&self) -> &[YearMonth] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn column(&self, field: Field, ticker: &Ticker) -> Result<&[Option<f64>], FrameError> {
        normalizer::lookup(&self.columns, field, ticker)
    }

    pub fn columns_for(&self, field: Field) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
        normalizer::columns_for(&self.columns, field)
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        normalizer::tickers(&self.columns)
    }
}

/// Groups rows by calendar month and averages each column over the values
/// present in the group. A group with no present value yields `None`.
pub fn aggregate_monthly<T: MonthKeyed + ?Sized>(table: &T) -> MonthlyTable {
    let keys = table.month_keys();

    let mut periods = keys.clone();
    periods.sort_unstable();
    periods.dedup();

    let group_of: BTreeMap<YearMonth, usize> = periods
        .iter()
        .enumerate()
        .map(|(group, period)| (*period, group))
        .collect();

    let mut columns = ColumnMap::new();
    for (key, values) in table.value_columns() {
        let mut sums = vec![0.0; periods.len()];
        let mut counts = vec![0usize; periods.len()];

        for (period, value) in keys.iter().zip(values.iter()) {
            if let (Some(value), Some(&group)) = (value, group_of.get(period)) {
                sums[group] += value;
                counts[group] += 1;
            }
        }

        let means = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
            .collect();

        columns.insert(key.clone(), means);
    }

    debug!(
        months = periods.len(),
        columns = columns.len(),
        "aggregated monthly averages"
    );

    MonthlyTable { periods, columns }
}
