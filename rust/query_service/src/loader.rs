// src/loader.rs

use chrono::NaiveDate;
use reqwest::Client;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ChartResponse, ChartResult};
use stock_frames::{Field, FrameError, Observation, RawSeries, Ticker};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// The chart endpoint rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error for {ticker}: {code} - {description}")]
    Provider {
        ticker: String,
        code: String,
        description: String,
    },

    #[error("Provider answered HTTP {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("Provider returned no price history for {0}")]
    EmptyResult(String),

    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No price history could be downloaded for any of the {0} requested tickers")]
    NoData(usize),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Daily history client for the Yahoo Finance chart endpoint.
pub struct PriceLoader {
    client: Client,
    base_url: String,
}

impl PriceLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        PriceLoader { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Downloads `[start, end)` daily bars for one ticker, split per field.
    pub async fn fetch_history(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Field, Vec<Observation>>, LoaderError> {
        let (period1, period2) = epoch_range(start, end)?;
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        debug!(%ticker, %start, %end, "requesting price history");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: ChartResponse = response.json().await?;
            return Ok(first_result(ticker, body)?.field_series());
        }

        // Error statuses usually still carry the provider's own explanation
        match response.json::<ChartResponse>().await {
            Ok(body) if body.chart.error.is_some() => {
                first_result(ticker, body).map(|result| result.field_series())
            }
            _ => Err(LoaderError::Status {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    /// Downloads every ticker in turn.
    ///
    /// A ticker that fails is logged and recorded on the returned series so the
    /// gap can be reported; only a download where every ticker failed is an
    /// error.
    pub async fn fetch_all(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, LoaderError> {
        epoch_range(start, end)?;

        let mut raw = RawSeries::new(tickers.to_vec());

        for ticker in tickers {
            match self.fetch_history(ticker, start, end).await {
                Ok(series) if series.is_empty() => {
                    warn!(%ticker, "provider returned no usable observations");
                    raw.record_failure(ticker.clone(), "provider returned no usable observations");
                }
                Ok(series) => {
                    info!(%ticker, fields = series.len(), "downloaded price history");
                    for (field, observations) in series {
                        raw.insert(ticker.clone(), field, observations)?;
                    }
                }
                Err(err) => {
                    warn!(%ticker, error = %err, "price history download failed");
                    raw.record_failure(ticker.clone(), err.to_string());
                }
            }
        }

        if raw.is_empty() {
            return Err(LoaderError::NoData(tickers.len()));
        }

        Ok(raw)
    }
}

fn first_result(ticker: &Ticker, body: ChartResponse) -> Result<ChartResult, LoaderError> {
    if let Some(error) = body.chart.error {
        return Err(LoaderError::Provider {
            ticker: ticker.to_string(),
            code: error.code,
            description: error.description,
        });
    }

    body.chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| LoaderError::EmptyResult(ticker.to_string()))
}

// Midnight UTC epoch seconds of both bounds
fn epoch_range(start: NaiveDate, end: NaiveDate) -> Result<(i64, i64), LoaderError> {
    let invalid = || LoaderError::InvalidRange { start, end };
    if start >= end {
        return Err(invalid());
    }

    let period1 = start.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc().timestamp();
    let period2 = end.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc().timestamp();
    Ok((period1, period2))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_range() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();

        assert_eq!(epoch_range(start, end).unwrap(), (1640995200, 1641081600));
        assert!(matches!(
            epoch_range(end, start),
            Err(LoaderError::InvalidRange { .. })
        ));
        assert!(epoch_range(start, start).is_err());
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let loader = PriceLoader::new("http://127.0.0.1:1234/");
        assert_eq!(loader.base_url(), "http://127.0.0.1:1234");
    }
}
