// src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

use crate::raw::{Field, Ticker};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("Invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid column name: {0}")]
    InvalidColumnName(String),

    #[error("Invalid month period: {0}")]
    InvalidPeriod(String),

    #[error("Series {field}_{ticker} is not sorted by date at {date}")]
    UnsortedSeries {
        ticker: Ticker,
        field: Field,
        date: NaiveDate,
    },

    #[error("Series {field}_{ticker} has more than one value for {date}")]
    DuplicateDate {
        ticker: Ticker,
        field: Field,
        date: NaiveDate,
    },

    #[error("No data for {field}_{ticker}")]
    MissingColumn { field: Field, ticker: Ticker },
}
