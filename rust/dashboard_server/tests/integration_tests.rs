// tests/integration_tests.rs

use actix_web::{http::StatusCode, test, web, App};
use chrono::NaiveDate;
use dashboard_server::configure;
use serde_json::Value;
use stock_frames::{DashboardData, Field, Observation, RawSeries, Ticker};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, month, day).unwrap()
}

fn ticker(symbol: &str) -> Ticker {
    Ticker::new(symbol).unwrap()
}

// AAPL and MSFT over a few days in January and February; TSLA failed to download
fn dashboard_data() -> DashboardData {
    let days = [date(1, 3), date(1, 4), date(1, 5), date(2, 1), date(2, 2)];
    let mut raw = RawSeries::new(vec![ticker("AAPL"), ticker("MSFT"), ticker("TSLA")]);

    let series = |values: [f64; 5]| -> Vec<Observation> {
        days.iter()
            .zip(values)
            .map(|(d, v)| Observation::new(*d, v))
            .collect()
    };

    raw.insert(ticker("AAPL"), Field::Close, series([182.0, 179.7, 174.9, 174.6, 175.8]))
        .unwrap();
    raw.insert(ticker("AAPL"), Field::Volume, series([104.0, 99.0, 94.0, 86.0, 84.0]))
        .unwrap();
    raw.insert(ticker("MSFT"), Field::Close, series([334.7, 329.0, 316.4, 310.9, 315.0]))
        .unwrap();
    raw.insert(ticker("MSFT"), Field::Volume, series([28.0, 32.0, 40.0, 40.5, 36.6]))
        .unwrap();
    raw.record_failure(ticker("TSLA"), "No data found, symbol may be delisted");

    DashboardData::from_raw(&raw)
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(dashboard_data()))
                .configure(configure),
        )
        .await
    };
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let app = app!();
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_rt::test]
async fn test_health_check() {
    let app = app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");
}

#[actix_rt::test]
async fn test_tickers_lists_companies_and_absences() {
    let (status, body) = get_json("/api/tickers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let companies = body["data"]["companies"].as_array().unwrap();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0]["ticker"], "AAPL");
    assert_eq!(companies[0]["name"], "Apple");

    let absences = body["data"]["absences"].as_array().unwrap();
    assert!(absences.iter().any(|a| a["ticker"] == "TSLA"));
}

#[actix_rt::test]
async fn test_metrics_catalog() {
    let (status, body) = get_json("/api/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["selectable"].as_array().unwrap().len(), 6);
    assert_eq!(body["data"]["heatmap"][0], "Adj Close");
    assert_eq!(body["data"]["correlation"][1], "Volume");
}

#[actix_rt::test]
async fn test_series_for_present_column() {
    let (status, body) = get_json("/api/series?ticker=AAPL&metric=Close").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Close Over Time for AAPL");
    assert_eq!(body["data"]["dates"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"]["values"][0], 182.0);
}

#[actix_rt::test]
async fn test_series_missing_column_is_not_found() {
    let (status, body) = get_json("/api/series?ticker=TSLA&metric=Close").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
}

#[actix_rt::test]
async fn test_series_unknown_metric_is_bad_request() {
    let (status, body) = get_json("/api/series?ticker=AAPL&metric=Price").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = get_json("/api/series?ticker=AA_PL&metric=Close").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_scatter_pairs_fields() {
    let (status, body) = get_json("/api/scatter?ticker=MSFT&x=Volume&y=Close").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Volume vs Close for MSFT");
    assert_eq!(body["data"]["points"].as_array().unwrap().len(), 5);
}

#[actix_rt::test]
async fn test_monthly_heatmap() {
    let (status, body) = get_json("/api/heatmap/monthly?metric=Close").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["x_labels"], serde_json::json!(["2022-01", "2022-02"]));
    assert_eq!(body["data"]["y_labels"], serde_json::json!(["AAPL", "MSFT"]));

    let (status, _) = get_json("/api/heatmap/monthly?metric=Open").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_correlation_matrix() {
    let (status, body) = get_json("/api/correlation?metric=Close").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Correlation Heatmap (Close)");

    let cells = body["data"]["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0][0]["value"], 1.0);
    assert_eq!(cells[0][1]["value"], cells[1][0]["value"]);
}

#[actix_rt::test]
async fn test_correlation_unknown_metric() {
    let (status, body) = get_json("/api/correlation?metric=Volumne").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "No data available for the selected metric: Volumne"
    );
}

#[actix_rt::test]
async fn test_table_csv_export() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/table.csv").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/csv"
    );

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "Date,Close_AAPL,Close_MSFT,Volume_AAPL,Volume_MSFT");
    assert_eq!(text.lines().count(), 6);
}
