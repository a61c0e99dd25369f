//! Pricewatch Alert Monitor
//!
//! Runs the fetch-evaluate-sleep loop until Ctrl-C.
//! Single-threaded: rows are evaluated strictly one after another.

use dotenvy::dotenv;
use pricewatch::config::Settings;
use pricewatch::core::http;
use pricewatch::core::{MonitorContext, MonitorRuntime};
use pricewatch::logging;
use pricewatch::metrics::Metrics;
use pricewatch::services::{
    build_http_client, NotionRecordSource, TelegramNotifier, YahooQuoteProvider,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let env = pricewatch::config::get_environment();
    info!("Starting Pricewatch Alert Monitor");
    info!(environment = %env, "Environment");

    let metrics = Arc::new(Metrics::new()?);

    if let Some(port) = settings.metrics_port {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = http::start_server(port, metrics).await {
                warn!(error = %e, "Health and metrics endpoint stopped");
            }
        });
    }

    let client = build_http_client(settings.http_timeout)?;
    let context = MonitorContext::new(
        Arc::new(NotionRecordSource::new(client.clone(), settings.notion.clone())),
        Arc::new(YahooQuoteProvider::new(client.clone(), settings.quotes.clone())),
        Arc::new(TelegramNotifier::new(client, settings.telegram.clone())),
    )
    .with_metrics(metrics);

    let mut runtime = MonitorRuntime::new(context, settings.monitor);
    runtime
        .run_until(async {
            if let Err(e) = signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Alert monitor stopped");
    Ok(())
}
