// src/lib.rs

pub mod config;
pub mod handlers;
pub mod models;
pub mod telemetry;

use actix_web::web;
use stock_frames::DashboardData;

pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{
        correlation, health_check, metrics, monthly_heatmap, scatter, series, table_csv, tickers,
    };

    cfg.service(health_check)
        .service(tickers)
        .service(metrics)
        .service(series)
        .service(scatter)
        .service(monthly_heatmap)
        .service(correlation)
        .service(table_csv);
}

pub async fn run_server(bind_addr: &str, data: DashboardData) -> std::io::Result<()> {
    use actix_web::{App, HttpServer};

    let data = web::Data::new(data);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
