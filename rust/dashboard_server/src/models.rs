// src/models.rs

use serde::{Deserialize, Serialize};
use stock_frames::{Absence, Field};
use validator::Validate;

// Every JSON endpoint answers with this envelope
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: "OK".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

// Query strings

#[derive(Deserialize, Validate, Debug)]
pub struct SeriesQuery {
    #[validate(length(min = 1, max = 12))]
    pub ticker: String,
    #[validate(length(min = 1))]
    pub metric: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct ScatterQuery {
    #[validate(length(min = 1, max = 12))]
    pub ticker: String,
    #[validate(length(min = 1))]
    pub x: String,
    #[validate(length(min = 1))]
    pub y: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct MetricQuery {
    #[validate(length(min = 1))]
    pub metric: String,
}

// Payloads

#[derive(Serialize, Debug)]
pub struct CompanyEntry {
    pub ticker: String,
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct TickersPayload {
    pub companies: Vec<CompanyEntry>,
    pub absences: Vec<Absence>,
}

#[derive(Serialize, Debug)]
pub struct MetricsPayload {
    pub selectable: Vec<Field>,
    pub heatmap: Vec<Field>,
    pub correlation: Vec<Field>,
}
