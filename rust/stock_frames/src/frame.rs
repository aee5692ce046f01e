// src/frame.rs

use polars::prelude::*;

use crate::aggregator::MonthlyTable;
use crate::normalizer::{ColumnMap, NormalizedTable};

fn value_series(columns: &ColumnMap) -> Vec<Series> {
    columns
        .iter()
        .map(|(key, values)| Series::new(&key.to_string(), values.as_slice()))
        .collect()
}

impl NormalizedTable {
    /// `Date` column followed by one `{field}_{ticker}` column per key;
    /// missing values become nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut series = Vec::with_capacity(self.columns().len() + 1);
        series.push(Series::new("Date", self.dates()));
        series.extend(value_series(self.columns()));
        DataFrame::new(series)
    }
}

impl MonthlyTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let months: Vec<String> = self.periods().iter().map(ToString::to_string).collect();

        let mut series = Vec::with_capacity(self.columns().len() + 1);
        series.push(Series::new("Month", months));
        series.extend(value_series(self.columns()));
        DataFrame::new(series)
    }
}

pub fn write_csv(df: &mut DataFrame) -> PolarsResult<Vec<u8>> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(df)?;
    Ok(buffer)
}
