// src/correlation.rs

use ndarray::Array2;
use tracing::debug;

use crate::normalizer::NormalizedTable;
use crate::raw::{Field, Ticker};

/// Pairwise Pearson correlation between the tickers of one field.
///
/// Undefined cells (too few overlapping rows, constant series) are stored as
/// NaN and surface as `None` through [`CorrelationMatrix::get`].
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    field: Field,
    tickers: Vec<Ticker>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn dim(&self) -> usize {
        self.tickers.len()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values
            .get((row, col))
            .copied()
            .filter(|value| !value.is_nan())
    }

    pub fn between(&self, a: &Ticker, b: &Ticker) -> Option<f64> {
        let row = self.tickers.iter().position(|t| t == a)?;
        let col = self.tickers.iter().position(|t| t == b)?;
        self.get(row, col)
    }

    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        (0..self.dim())
            .map(|row| (0..self.dim()).map(|col| self.get(row, col)).collect())
            .collect()
    }
}

// Undefined cells compare equal to each other
impl PartialEq for CorrelationMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.tickers == other.tickers
            && self.values.shape() == other.values.shape()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationOutcome {
    Matrix(CorrelationMatrix),
    /// No column of the table matches the requested field.
    NoData { field: String },
}

impl CorrelationOutcome {
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            CorrelationOutcome::Matrix(matrix) => Some(matrix),
            CorrelationOutcome::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, CorrelationOutcome::NoData { .. })
    }
}

/// Correlates every `{field}_*` column of the table. Unknown field names
/// behave like fields with no columns.
pub fn correlate(table: &NormalizedTable, field: &str) -> CorrelationOutcome {
    match field.parse::<Field>() {
        Ok(parsed) => correlate_field(table, parsed),
        Err(_) => {
            debug!(field, "correlation requested for unknown field");
            CorrelationOutcome::NoData {
                field: field.to_string(),
            }
        }
    }
}

pub fn correlate_field(table: &NormalizedTable, field: Field) -> CorrelationOutcome {
    let columns: Vec<(Ticker, &[Option<f64>])> = table
        .columns_for(field)
        .map(|(key, values)| (key.ticker.clone(), values))
        .collect();

    if columns.is_empty() {
        return CorrelationOutcome::NoData {
            field: field.label().to_string(),
        };
    }

    let n = columns.len();
    let mut values = Array2::from_elem((n, n), f64::NAN);

    // Upper triangle only, mirrored, so the matrix is exactly symmetric
    for i in 0..n {
        if varies(columns[i].1) {
            values[[i, i]] = 1.0;
        }
        for j in (i + 1)..n {
            let r = pearson(columns[i].1, columns[j].1).unwrap_or(f64::NAN);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    debug!(field = %field, tickers = n, "computed correlation matrix");

    CorrelationOutcome::Matrix(CorrelationMatrix {
        field,
        tickers: columns.into_iter().map(|(ticker, _)| ticker).collect(),
        values,
    })
}

/// Pearson correlation over the rows where both series have a value.
///
/// Returns `None` with fewer than two such rows or when either side is
/// constant over them.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    let (first_x, first_y) = *pairs.first()?;
    if pairs.len() < 2
        || pairs.iter().all(|(a, _)| *a == first_x)
        || pairs.iter().all(|(_, b)| *b == first_y)
    {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn varies(values: &[Option<f64>]) -> bool {
    let mut present = values.iter().flatten();
    match present.next() {
        Some(first) => present.any(|value| value != first),
        None => false,
    }
}
