//! Campaign Report API Server
//!
//! Serves campaign performance reports over HTTP.

use anyhow::Context;
use campaign_report::config::Config;
use campaign_report::klaviyo::KlaviyoClient;
use campaign_report::report::ReportBuilder;
use campaign_report::{logging, serve, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "campaign-report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Campaign performance report server")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    logging::init(&config.logging);

    tracing::info!("Campaign Report v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("invalid configuration")?;

    let klaviyo = Arc::new(
        KlaviyoClient::new(config.klaviyo.client_config())
            .context("failed to build Klaviyo client")?,
    );
    tracing::info!(base_url = %config.klaviyo.base_url, "Klaviyo client ready");

    let reports = Arc::new(ReportBuilder::new(
        klaviyo.clone(),
        config.report.metric_config(),
        config.report.builder_config(),
    ));

    let api_config = config.api_config();
    let state = AppState::new(klaviyo, reports, api_config.clone());

    serve(state, &api_config).await?;

    tracing::info!("Campaign Report shutdown complete");
    Ok(())
}
