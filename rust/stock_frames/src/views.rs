// src/views.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregator::MonthlyTable;
use crate::correlation::CorrelationMatrix;
use crate::error::FrameError;
use crate::normalizer::NormalizedTable;
use crate::raw::{Field, Ticker};

// Fixed colour range of the monthly heatmaps
pub const HEATMAP_Z_RANGE: (f64, f64) = (0.0, 900.0);
pub const CORRELATION_Z_RANGE: (f64, f64) = (-1.0, 1.0);

// Cells above this magnitude get light label text
const LIGHT_TEXT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub title: String,
    pub ticker: Ticker,
    pub field: Field,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub title: String,
    pub ticker: Ticker,
    pub x_field: Field,
    pub y_field: Field,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    /// One row per y label, one cell per x label.
    pub z: Vec<Vec<Option<f64>>>,
    pub z_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub value: Option<f64>,
    pub label: String,
    pub light_text: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationHeatmap {
    pub title: String,
    pub field: Field,
    pub tickers: Vec<Ticker>,
    pub cells: Vec<Vec<CorrelationCell>>,
    pub z_range: (f64, f64),
}

/// One field of one ticker over the full date index.
pub fn line_series(
    table: &NormalizedTable,
    ticker: &Ticker,
    field: Field,
) -> Result<LineSeries, FrameError> {
    let values = table.column(field, ticker)?;

    Ok(LineSeries {
        title: format!("{} Over Time for {}", field, ticker),
        ticker: ticker.clone(),
        field,
        dates: table.dates().to_vec(),
        values: values.to_vec(),
    })
}

/// Pairs two fields of one ticker date by date, skipping dates where either
/// value is missing.
pub fn scatter_series(
    table: &NormalizedTable,
    ticker: &Ticker,
    x_field: Field,
    y_field: Field,
) -> Result<ScatterSeries, FrameError> {
    let xs = table.column(x_field, ticker)?;
    let ys = table.column(y_field, ticker)?;

    let points = table
        .dates()
        .iter()
        .zip(xs.iter().zip(ys.iter()))
        .filter_map(|(date, (x, y))| {
            Some(ScatterPoint {
                date: *date,
                x: (*x)?,
                y: (*y)?,
            })
        })
        .collect();

    Ok(ScatterSeries {
        title: format!("{} vs {} for {}", x_field, y_field, ticker),
        ticker: ticker.clone(),
        x_field,
        y_field,
        points,
    })
}

/// Months on the x axis, tickers on the y axis. `None` when the field has no
/// column in the table.
pub fn monthly_heatmap(monthly: &MonthlyTable, field: Field) -> Option<Heatmap> {
    let (y_labels, z): (Vec<String>, Vec<Vec<Option<f64>>>) = monthly
        .columns_for(field)
        .map(|(key, values)| (key.ticker.to_string(), values.to_vec()))
        .unzip();

    if y_labels.is_empty() {
        return None;
    }

    Some(Heatmap {
        title: format!("Monthly Average {}", field),
        x_labels: monthly.periods().iter().map(ToString::to_string).collect(),
        y_labels,
        z,
        z_range: HEATMAP_Z_RANGE,
    })
}

pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> CorrelationHeatmap {
    let cells = matrix
        .rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| CorrelationCell {
                    value,
                    label: value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
                    light_text: value.map_or(false, |v| v.abs() > LIGHT_TEXT_THRESHOLD),
                })
                .collect()
        })
        .collect();

    CorrelationHeatmap {
        title: format!("Correlation Heatmap ({})", matrix.field()),
        field: matrix.field(),
        tickers: matrix.tickers().to_vec(),
        cells,
        z_range: CORRELATION_Z_RANGE,
    }
}
