// src/config.rs

use chrono::{NaiveDate, Utc};
use query_service::DEFAULT_BASE_URL;
use std::collections::HashSet;
use stock_frames::catalog;
use stock_frames::{FrameError, Ticker};
use thiserror::Error;
use validator::Validate;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Ticker(#[from] FrameError),
}

#[derive(Debug, Clone, Validate)]
pub struct DashboardConfig {
    #[validate(length(min = 1))]
    pub bind_addr: String,
    #[validate(url)]
    pub provider_url: String,
    #[validate(length(min = 1, max = 50))]
    pub tickers: Vec<Ticker>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1))]
    pub log_level: String,
}

impl DashboardConfig {
    /// Reads `DASHBOARD_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), Utc::now().date_naive())
    }

    /// `today` is the default (exclusive) end of the download window.
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tickers = match get("DASHBOARD_TICKERS") {
            Some(list) => parse_tickers(&list)?,
            None => catalog::default_tickers(),
        };

        let start_date = match get("DASHBOARD_START_DATE") {
            Some(value) => parse_date("DASHBOARD_START_DATE", &value)?,
            None => catalog::default_start_date().ok_or(ConfigError::InvalidValue {
                key: "DASHBOARD_START_DATE",
                value: catalog::DEFAULT_START_DATE.to_string(),
            })?,
        };

        let end_date = match get("DASHBOARD_END_DATE") {
            Some(value) => parse_date("DASHBOARD_END_DATE", &value)?,
            None => today,
        };

        let config = DashboardConfig {
            bind_addr: get("DASHBOARD_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            provider_url: get("DASHBOARD_PROVIDER_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            tickers,
            start_date,
            end_date,
            log_level: get("DASHBOARD_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        config.validate()?;
        if config.start_date >= config.end_date {
            return Err(ConfigError::InvalidValue {
                key: "DASHBOARD_END_DATE",
                value: format!("{} is not after start date {}", config.end_date, config.start_date),
            });
        }

        Ok(config)
    }
}

// Comma-separated, first occurrence wins
fn parse_tickers(list: &str) -> Result<Vec<Ticker>, ConfigError> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for symbol in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let ticker = Ticker::new(symbol)?;
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }

    Ok(tickers)
}

fn parse_date(key: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
