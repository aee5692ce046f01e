// src/handlers.rs

use actix_web::{get, web, HttpResponse, Responder};
use stock_frames::frame::write_csv;
use stock_frames::views::correlation_heatmap;
use stock_frames::{catalog, CorrelationOutcome, DashboardData, Field, FrameError, Ticker};
use tracing::{debug, error};
use validator::Validate;

use crate::models::{
    ApiResponse, CompanyEntry, MetricQuery, MetricsPayload, ScatterQuery, SeriesQuery,
    TickersPayload,
};

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::failure(message))
}

fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::failure(message))
}

// Malformed selections are the caller's fault; a well-formed one without a
// column is missing data
fn frame_error_response(err: FrameError) -> HttpResponse {
    match err {
        FrameError::MissingColumn { .. } => not_found(err.to_string()),
        _ => bad_request(err.to_string()),
    }
}

fn parse_selection(ticker: &str, names: &[&str]) -> Result<(Ticker, Vec<Field>), FrameError> {
    let ticker = Ticker::new(ticker)?;
    let fields = names
        .iter()
        .map(|metric| metric.parse::<Field>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((ticker, fields))
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[get("/api/tickers")]
pub async fn tickers(data: web::Data<DashboardData>) -> impl Responder {
    let companies = data
        .tickers()
        .into_iter()
        .map(|ticker| CompanyEntry {
            name: catalog::company_name(&ticker).unwrap_or(ticker.as_str()).to_string(),
            ticker: ticker.to_string(),
        })
        .collect();

    HttpResponse::Ok().json(ApiResponse::ok(TickersPayload {
        companies,
        absences: data.absences().to_vec(),
    }))
}

#[get("/api/metrics")]
pub async fn metrics() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(MetricsPayload {
        selectable: catalog::SELECTABLE_METRICS.to_vec(),
        heatmap: catalog::HEATMAP_METRICS.to_vec(),
        correlation: catalog::CORRELATION_METRICS.to_vec(),
    }))
}

#[get("/api/series")]
pub async fn series(
    data: web::Data<DashboardData>,
    query: web::Query<SeriesQuery>,
) -> impl Responder {
    if let Err(err) = query.validate() {
        return bad_request(err.to_string());
    }

    let (ticker, fields) = match parse_selection(&query.ticker, &[&query.metric]) {
        Ok(selection) => selection,
        Err(err) => return frame_error_response(err),
    };

    match data.line_series(&ticker, fields[0]) {
        Ok(line) => HttpResponse::Ok().json(ApiResponse::ok(line)),
        Err(err) => frame_error_response(err),
    }
}

#[get("/api/scatter")]
pub async fn scatter(
    data: web::Data<DashboardData>,
    query: web::Query<ScatterQuery>,
) -> impl Responder {
    if let Err(err) = query.validate() {
        return bad_request(err.to_string());
    }

    let (ticker, fields) = match parse_selection(&query.ticker, &[&query.x, &query.y]) {
        Ok(selection) => selection,
        Err(err) => return frame_error_response(err),
    };

    match data.scatter_series(&ticker, fields[0], fields[1]) {
        Ok(points) => HttpResponse::Ok().json(ApiResponse::ok(points)),
        Err(err) => frame_error_response(err),
    }
}

#[get("/api/heatmap/monthly")]
pub async fn monthly_heatmap(
    data: web::Data<DashboardData>,
    query: web::Query<MetricQuery>,
) -> impl Responder {
    if let Err(err) = query.validate() {
        return bad_request(err.to_string());
    }

    let field = match query.metric.parse::<Field>() {
        Ok(field) => field,
        Err(err) => return bad_request(err.to_string()),
    };

    match data.monthly_heatmap(field) {
        Some(heatmap) => HttpResponse::Ok().json(ApiResponse::ok(heatmap)),
        None => not_found(format!("No data available for the selected metric: {}", query.metric)),
    }
}

// Unknown metric names are treated like metrics with no columns
#[get("/api/correlation")]
pub async fn correlation(
    data: web::Data<DashboardData>,
    query: web::Query<MetricQuery>,
) -> impl Responder {
    if let Err(err) = query.validate() {
        return bad_request(err.to_string());
    }

    match data.correlation(&query.metric) {
        CorrelationOutcome::Matrix(matrix) => {
            debug!(field = %matrix.field(), tickers = matrix.dim(), "correlation computed");
            HttpResponse::Ok().json(ApiResponse::ok(correlation_heatmap(&matrix)))
        }
        CorrelationOutcome::NoData { field } => {
            not_found(format!("No data available for the selected metric: {}", field))
        }
    }
}

#[get("/api/table.csv")]
pub async fn table_csv(data: web::Data<DashboardData>) -> impl Responder {
    let csv = data
        .normalized()
        .to_dataframe()
        .and_then(|mut df| write_csv(&mut df));

    match csv {
        Ok(body) => HttpResponse::Ok().content_type("text/csv").body(body),
        Err(err) => {
            error!(error = %err, "failed to export normalized table");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::failure(format!("Failed to export table: {}", err)))
        }
    }
}
