// src/main.rs

use dashboard_server::config::DashboardConfig;
use dashboard_server::run_server;
use dashboard_server::telemetry::init_tracing;
use query_service::PriceLoader;
use stock_frames::DashboardData;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env()?;
    init_tracing(&config.log_level);

    info!(
        tickers = config.tickers.len(),
        start = %config.start_date,
        end = %config.end_date,
        provider = %config.provider_url,
        "downloading price history"
    );

    // A failed download for every ticker ends the session here
    let loader = PriceLoader::new(config.provider_url.clone());
    let raw = loader
        .fetch_all(&config.tickers, config.start_date, config.end_date)
        .await
        .map_err(|err| {
            error!(error = %err, "price history download failed");
            err
        })?;

    let data = DashboardData::from_raw(&raw);
    for absence in data.absences() {
        match absence.field {
            Some(field) => warn!(
                ticker = %absence.ticker,
                %field,
                reason = %absence.reason,
                "no data for field"
            ),
            None => warn!(
                ticker = %absence.ticker,
                reason = %absence.reason,
                "no data for ticker"
            ),
        }
    }

    info!("Starting dashboard server at http://{}", config.bind_addr);
    run_server(&config.bind_addr, data).await?;

    Ok(())
}
