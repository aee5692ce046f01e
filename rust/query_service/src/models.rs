// src/models.rs

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

use stock_frames::{Field, Observation};

// Provider sends nulls for halted or not-yet-settled bars
fn nullable_values<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<Option<f64>>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// Shift a bar's UTC epoch timestamp into exchange time before taking its date
pub fn epoch_to_date(timestamp: i64, gmt_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmt_offset, 0).map(|dt| dt.date_naive())
}

// Define Chart API structure
#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "gmtoffset", default)]
    pub gmt_offset: i64,
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

// Struct for the daily bars, one entry per timestamp
#[derive(Deserialize, Debug)]
pub struct Quote {
    #[serde(default, deserialize_with = "nullable_values")]
    pub open: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "nullable_values")]
    pub high: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "nullable_values")]
    pub low: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "nullable_values")]
    pub close: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "nullable_values")]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
pub struct AdjClose {
    #[serde(default, deserialize_with = "nullable_values")]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    pub fn dates(&self) -> Vec<Option<NaiveDate>> {
        self.timestamp
            .iter()
            .map(|ts| epoch_to_date(*ts, self.meta.gmt_offset))
            .collect()
    }

    fn values(&self, field: Field) -> Option<&[Option<f64>]> {
        let quote = self.indicators.quote.first();
        let values = match field {
            Field::Open => quote.map(|q| &q.open),
            Field::High => quote.map(|q| &q.high),
            Field::Low => quote.map(|q| &q.low),
            Field::Close => quote.map(|q| &q.close),
            Field::Volume => quote.map(|q| &q.volume),
            Field::AdjClose => self.indicators.adjclose.first().map(|a| &a.adjclose),
        };
        values.map(Vec::as_slice)
    }

    /// Splits the bars into one ascending series per field.
    ///
    /// Null values are skipped. When two bars land on the same date (the
    /// provider appends a live bar for the current session) the later one wins.
    pub fn field_series(&self) -> BTreeMap<Field, Vec<Observation>> {
        let dates = self.dates();
        let mut series = BTreeMap::new();

        for field in Field::ALL {
            let Some(values) = self.values(field) else {
                continue;
            };

            let by_date: BTreeMap<NaiveDate, f64> = dates
                .iter()
                .zip(values.iter())
                .filter_map(|(date, value)| Some(((*date)?, (*value)?)))
                .filter(|(_, value)| value.is_finite())
                .collect();

            if !by_date.is_empty() {
                let observations = by_date
                    .into_iter()
                    .map(|(date, value)| Observation::new(date, value))
                    .collect();
                series.insert(field, observations);
            }
        }

        series
    }
}
