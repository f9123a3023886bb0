//! Derived per-campaign performance ratios

use serde::Serialize;

use super::metrics::CampaignMetrics;

/// One line of the campaign performance report
///
/// Ratios are fractions (a 1% conversion rate is `0.01`) and are not rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub total_recipients: u64,
    pub orders_placed: u64,
    /// Orders per recipient
    pub conversion_rate: f64,
    /// Average order value
    pub conversion_value: f64,
    pub revenue_per_recipient: f64,
}

impl ReportRow {
    /// Compute a row from a campaign's metrics and its recipient estimate
    ///
    /// If orders, revenue or recipients is zero, every ratio is zero.
    /// The raw order and recipient counts are always kept.
    pub fn compute(name: impl Into<String>, metrics: CampaignMetrics, recipients: u64) -> Self {
        let mut row = ReportRow {
            name: name.into(),
            total_recipients: recipients,
            orders_placed: metrics.count,
            conversion_rate: 0.0,
            conversion_value: 0.0,
            revenue_per_recipient: 0.0,
        };

        if metrics.count == 0 || metrics.revenue == 0.0 || recipients == 0 {
            return row;
        }

        let orders = metrics.count as f64;
        let recipients = recipients as f64;

        row.conversion_rate = orders / recipients;
        row.conversion_value = metrics.revenue / orders;
        row.revenue_per_recipient = metrics.revenue / recipients;
        row
    }
}
