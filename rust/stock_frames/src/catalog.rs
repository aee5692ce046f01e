// src/catalog.rs

use chrono::NaiveDate;
use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::raw::{Field, Ticker};

pub const DEFAULT_TICKERS: [&str; 9] = [
    "AAPL", "MSFT", "GOOGL", "META", "TSLA", "LLY", "NVDA", "AVGO", "QQQ",
];

pub const DEFAULT_START_DATE: &str = "2022-01-01";

// Metric menus of the dashboard
pub const SELECTABLE_METRICS: [Field; 6] = Field::ALL;
pub const HEATMAP_METRICS: [Field; 4] = [Field::AdjClose, Field::Open, Field::High, Field::Low];
pub const CORRELATION_METRICS: [Field; 5] = [
    Field::AdjClose,
    Field::Volume,
    Field::Open,
    Field::High,
    Field::Low,
];

lazy_static! {
    pub static ref COMPANY_NAMES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("AAPL", "Apple");
        m.insert("MSFT", "Microsoft");
        m.insert("GOOGL", "Alphabet");
        m.insert("META", "Meta Platforms");
        m.insert("TSLA", "Tesla");
        m.insert("LLY", "Eli Lilly");
        m.insert("NVDA", "NVIDIA");
        m.insert("AVGO", "Broadcom");
        m.insert("QQQ", "Invesco QQQ");
        m
    };
}

pub fn company_name(ticker: &Ticker) -> Option<&'static str> {
    COMPANY_NAMES.get(ticker.as_str()).copied()
}

pub fn default_tickers() -> Vec<Ticker> {
    DEFAULT_TICKERS
        .iter()
        .filter_map(|symbol| Ticker::new(*symbol).ok())
        .collect()
}

pub fn default_start_date() -> Option<NaiveDate> {
    NaiveDate::parse_from_str(DEFAULT_START_DATE, "%Y-%m-%d").ok()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_ticker_has_a_name() {
        let tickers = default_tickers();
        assert_eq!(tickers.len(), DEFAULT_TICKERS.len());
        for ticker in &tickers {
            assert!(company_name(ticker).is_some(), "missing name for {}", ticker);
        }
        assert_eq!(company_name(&Ticker::new("QQQ").unwrap()), Some("Invesco QQQ"));
        assert_eq!(company_name(&Ticker::new("IBM").unwrap()), None);
    }

    #[test]
    fn test_default_start_date() {
        assert_eq!(default_start_date(), NaiveDate::from_ymd_opt(2022, 1, 1));
    }
}
