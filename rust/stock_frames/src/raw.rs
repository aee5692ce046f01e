// src/raw.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// One of the daily price/volume fields a provider returns per ticker.
///
/// The declaration order is the column order used by every derived table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    #[serde(rename = "Adj Close")]
    AdjClose,
    Volume,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::AdjClose,
        Field::Volume,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::AdjClose => "Adj Close",
            Field::Volume => "Volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = FrameError;

    // "Adj Close", "adj_close" and "AdjClose" all name the same field
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "open" => Ok(Field::Open),
            "high" => Ok(Field::High),
            "low" => Ok(Field::Low),
            "close" => Ok(Field::Close),
            "adjclose" => Ok(Field::AdjClose),
            "volume" => Ok(Field::Volume),
            _ => Err(FrameError::UnknownField(s.to_string())),
        }
    }
}

/// Ticker symbol. Never empty; only ASCII alphanumerics and `.`, `-`, `^`, `=`
/// as used by exchange symbols. `_` is reserved as the column name separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub const MAX_LEN: usize = 12;

    pub fn new(symbol: impl Into<String>) -> Result<Self, FrameError> {
        let symbol = symbol.into();
        let trimmed = symbol.trim();

        let valid = !trimmed.is_empty()
            && trimmed.len() <= Self::MAX_LEN
            && trimmed.chars().all(Self::is_symbol_char);

        if valid {
            Ok(Ticker(trimmed.to_string()))
        } else {
            Err(FrameError::InvalidTicker(symbol))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // The symbol ends up as a URL path segment; anything outside this set
    // could change the request
    fn is_symbol_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::new(s)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Observation { date, value }
    }
}

/// Per-ticker, per-field daily history as downloaded, before alignment.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    requested: Vec<Ticker>,
    series: BTreeMap<Ticker, BTreeMap<Field, Vec<Observation>>>,
    failures: BTreeMap<Ticker, String>,
}

impl RawSeries {
    pub fn new(requested: Vec<Ticker>) -> Self {
        let mut raw = RawSeries::default();
        for ticker in requested {
            raw.track(&ticker);
        }
        raw
    }

    fn track(&mut self, ticker: &Ticker) {
        if !self.requested.contains(ticker) {
            self.requested.push(ticker.clone());
        }
    }

    /// Stores one field's history for a ticker.
    ///
    /// Dates must be strictly ascending. Non-finite values are dropped so that
    /// the date shows up as missing downstream; a series with no finite value
    /// left is not stored at all.
    pub fn insert(
        &mut self,
        ticker: Ticker,
        field: Field,
        observations: Vec<Observation>,
    ) -> Result<(), FrameError> {
        let mut previous: Option<NaiveDate> = None;
        let mut kept = Vec::with_capacity(observations.len());

        for observation in observations {
            if let Some(prev) = previous {
                if observation.date < prev {
                    return Err(FrameError::UnsortedSeries {
                        ticker,
                        field,
                        date: observation.date,
                    });
                }
                if observation.date == prev {
                    return Err(FrameError::DuplicateDate {
                        ticker,
                        field,
                        date: observation.date,
                    });
                }
            }
            previous = Some(observation.date);

            if observation.value.is_finite() {
                kept.push(observation);
            }
        }

        self.track(&ticker);
        if !kept.is_empty() {
            self.series.entry(ticker).or_default().insert(field, kept);
        }
        Ok(())
    }

    /// Marks a ticker whose download failed; it stays in the requested set.
    pub fn record_failure(&mut self, ticker: Ticker, reason: impl Into<String>) {
        self.track(&ticker);
        self.failures.insert(ticker, reason.into());
    }

    pub fn requested(&self) -> &[Ticker] {
        &self.requested
    }

    pub fn failures(&self) -> &BTreeMap<Ticker, String> {
        &self.failures
    }

    pub fn series(&self, ticker: &Ticker, field: Field) -> Option<&[Observation]> {
        self.series
            .get(ticker)
            .and_then(|fields| fields.get(&field))
            .map(Vec::as_slice)
    }

    pub fn fields(&self, ticker: &Ticker) -> Vec<Field> {
        self.series
            .get(ticker)
            .map(|fields| fields.keys().copied().collect())
            .unwrap_or_default()
    }

    /// True when no ticker has any stored observation.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub(crate) fn iter_series(&self) -> impl Iterator<Item = (&Ticker, Field, &[Observation])> {
        self.series.iter().flat_map(|(ticker, fields)| {
            fields
                .iter()
                .map(move |(field, observations)| (ticker, *field, observations.as_slice()))
        })
    }
}
