//! Campaign Performance Reports
//!
//! Joins Klaviyo campaign metadata with attributed "Placed Order" metrics and
//! derives conversion rate, average order value and revenue per recipient.
//!
//! ## Components
//!
//! - **Measurement Reducer** ([`measurement`]): validates and sums bucket lists
//! - **Metric Fetcher** ([`MetricFetcher`]): metric lookup and windowed aggregate
//! - **Campaign Enumerator** ([`CampaignEnumerator`]): eligible campaigns and recipient estimates
//! - **Report Assembler** ([`ReportBuilder`]): the join and the derived rows

mod builder;
mod campaigns;
mod error;
pub mod format;
pub mod measurement;
mod metrics;
mod row;

pub use builder::{join_metrics, ReportBuilder, ReportBuilderConfig};
pub use campaigns::{eligible_filter, Campaign, CampaignEnumerator};
pub use error::{ReportError, ReportResult};
pub use format::{format_currency, format_percent, DEFAULT_CURRENCY_SYMBOL};
pub use measurement::MeasurementBuckets;
pub use metrics::{
    find_metric_id, reduce_row, CampaignMetrics, MetricAggregateRow, MetricFetcher,
    MetricFetcherConfig, MetricWindow, MetricsByCampaignId, ATTRIBUTED_MESSAGE_DIMENSION,
    DEFAULT_INTEGRATION, PLACED_ORDER_METRIC, TRAILING_WINDOW_DAYS,
};
pub use row::ReportRow;
