//! # Campaign Report
//!
//! Email campaign performance reports for Klaviyo accounts.
//!
//! For every sent email campaign the report shows total recipients, orders placed,
//! conversion rate, average order value and revenue per recipient, using the
//! "Placed Order" metric attributed to each campaign over the trailing 30 days.
//!
//! ## Modules
//!
//! - [`klaviyo`]: Klaviyo API capability and its HTTP client
//! - [`report`]: Metric fetching, campaign enumeration and the report join
//! - [`api`]: REST API server with Axum
//! - [`config`]: File and environment configuration
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campaign_report::klaviyo::{KlaviyoClient, KlaviyoConfig};
//! use campaign_report::report::{ReportBuilder, format_percent};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KlaviyoClient::new(KlaviyoConfig {
//!         api_key: "pk_...".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let builder = ReportBuilder::new(Arc::new(client), Default::default(), Default::default());
//!     let rows = builder.build_report(chrono::Utc::now()).await?;
//!
//!     for row in rows {
//!         println!("{}: {}", row.name, format_percent(row.conversion_rate));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod klaviyo;
pub mod logging;
pub mod report;

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};

pub use klaviyo::{Filter, KlaviyoApi, KlaviyoClient, KlaviyoConfig, KlaviyoError};

pub use report::{
    Campaign, CampaignMetrics, MetricWindow, ReportBuilder, ReportError, ReportResult, ReportRow,
};
