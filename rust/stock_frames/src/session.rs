// src/session.rs

use tracing::info;

use crate::aggregator::{aggregate_monthly, MonthlyTable};
use crate::correlation::{correlate, CorrelationOutcome};
use crate::error::FrameError;
use crate::normalizer::{normalize, Absence, NormalizedTable};
use crate::raw::{Field, RawSeries, Ticker};
use crate::views::{self, Heatmap, LineSeries, ScatterSeries};

/// Tables derived once per session from the downloaded history.
///
/// Read-only after construction; every selection is passed in explicitly.
#[derive(Debug, Clone)]
pub struct DashboardData {
    normalized: NormalizedTable,
    monthly: MonthlyTable,
}

impl DashboardData {
    pub fn from_raw(raw: &RawSeries) -> Self {
        let normalized = normalize(raw);
        let monthly = aggregate_monthly(&normalized);

        info!(
            days = normalized.len(),
            months = monthly.len(),
            columns = normalized.columns().len(),
            absent = normalized.absences().len(),
            "dashboard tables ready"
        );

        DashboardData { normalized, monthly }
    }

    pub fn normalized(&self) -> &NormalizedTable {
        &self.normalized
    }

    pub fn monthly(&self) -> &MonthlyTable {
        &self.monthly
    }

    pub fn absences(&self) -> &[Absence] {
        self.normalized.absences()
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.normalized.tickers()
    }

    // Recomputed on every call
    pub fn correlation(&self, field: &str) -> CorrelationOutcome {
        correlate(&self.normalized, field)
    }

    pub fn line_series(&self, ticker: &Ticker, field: Field) -> Result<LineSeries, FrameError> {
        views::line_series(&self.normalized, ticker, field)
    }

    pub fn scatter_series(
        &self,
        ticker: &Ticker,
        x_field: Field,
        y_field: Field,
    ) -> Result<ScatterSeries, FrameError> {
        views::scatter_series(&self.normalized, ticker, x_field, y_field)
    }

    pub fn monthly_heatmap(&self, field: Field) -> Option<Heatmap> {
        views::monthly_heatmap(&self.monthly, field)
    }
}
