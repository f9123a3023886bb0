//! Campaign Report CLI
//!
//! Command-line interface for one-off reports:
//! - Build a report for the configured account
//! - List accounts visible to the API key
//! - Generate a config file

use anyhow::{bail, Context};
use campaign_report::api::dto::CampaignRowDto;
use campaign_report::config::{generate_default_config, Config};
use campaign_report::klaviyo::{KlaviyoApi, KlaviyoClient};
use campaign_report::report::{format_currency, format_percent, ReportBuilder, ReportRow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "campaign-report-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Email campaign performance reports for Klaviyo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the campaign report as of now
    Report {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List accounts visible to the API key
    Accounts,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report { json } => {
            let (config, client) = connect(cli.config.as_deref())?;
            let builder = ReportBuilder::new(
                client,
                config.report.metric_config(),
                config.report.builder_config(),
            );

            let rows = builder.build_report(Utc::now()).await?;
            let currency = &config.report.currency_symbol;

            if json {
                let rows: Vec<CampaignRowDto> = rows
                    .into_iter()
                    .map(|row| CampaignRowDto::new(row, currency))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&rows, currency);
            }
        }

        Commands::Accounts => {
            let (_, client) = connect(cli.config.as_deref())?;
            let accounts = client.list_accounts().await?;

            if accounts.is_empty() {
                println!("No accounts visible to this API key.");
            } else {
                println!("{:<12} {}", "ID", "Name");
                println!("{}", "-".repeat(40));

                for account in accounts {
                    println!("{:<12} {}", account.id, account.organization_name);
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Load config, start logging and build the Klaviyo client
fn connect(path: Option<&Path>) -> anyhow::Result<(Config, Arc<KlaviyoClient>)> {
    let config = match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    campaign_report::logging::init(&config.logging);

    if config.klaviyo.api_key.is_empty() {
        bail!("KLAVIYO_API_KEY not set");
    }

    let client = KlaviyoClient::new(config.klaviyo.client_config())
        .context("failed to build Klaviyo client")?;

    Ok((config, Arc::new(client)))
}

fn print_table(rows: &[ReportRow], currency: &str) {
    if rows.is_empty() {
        println!("No campaigns with attributed orders in the last 30 days");
        return;
    }

    println!(
        "{:<32} | {:>10} | {:>8} | {:>10} | {:>12} | {:>10}",
        "Campaign", "Recipients", "Orders", "Conv. rate", "Order value", "Rev/recip."
    );
    println!("{}", "-".repeat(97));

    for row in rows {
        println!(
            "{:<32} | {:>10} | {:>8} | {:>10} | {:>12} | {:>10}",
            truncate(&row.name, 32),
            row.total_recipients,
            row.orders_placed,
            format_percent(row.conversion_rate),
            format_currency(row.conversion_value, currency),
            format_currency(row.revenue_per_recipient, currency),
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
