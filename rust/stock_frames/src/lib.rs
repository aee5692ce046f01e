// src/lib.rs

pub mod aggregator;
pub mod catalog;
pub mod correlation;
pub mod error;
pub mod frame;
pub mod normalizer;
pub mod raw;
pub mod session;
pub mod views;

pub use aggregator::{aggregate_monthly, MonthKeyed, MonthlyTable, YearMonth};
pub use correlation::{correlate, correlate_field, pearson, CorrelationMatrix, CorrelationOutcome};
pub use error::FrameError;
pub use normalizer::{normalize, Absence, ColumnKey, ColumnMap, NormalizedTable};
pub use raw::{Field, Observation, RawSeries, Ticker};
pub use session::DashboardData;
