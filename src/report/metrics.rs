//! Metric Fetcher
//!
//! Resolves the conversion metric by name, then pulls a monthly aggregate of
//! it broken down by one dimension over a trailing window.
//!
//! Metric lookup is by exact name and the first match in upstream order wins.
//! A renamed metric fails the report with `MetricNotFound`. If two metrics share
//! the name, the first one listed is used.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{ReportError, ReportResult};
use super::measurement::MeasurementBuckets;
use crate::klaviyo::{
    AggregateRow, Filter, Interval, KlaviyoApi, Measurement, MetricAggregateQuery, MetricSummary,
};

/// The conversion metric reports are built from
pub const PLACED_ORDER_METRIC: &str = "Placed Order";

/// Breakdown dimension that carries the originating campaign id
pub const ATTRIBUTED_MESSAGE_DIMENSION: &str = "$attributed_message";

/// Length of the trailing metric window
pub const TRAILING_WINDOW_DAYS: i64 = 30;

/// Integration the metric catalog is filtered to by default
pub const DEFAULT_INTEGRATION: &str = "Shopify";

/// Half-open time window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl MetricWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ReportResult<Self> {
        if start >= end {
            return Err(ReportError::InvalidWindow);
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending at `end`
    pub fn trailing(end: DateTime<Utc>, days: i64) -> ReportResult<Self> {
        Self::new(end - Duration::days(days), end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn filter(&self) -> Filter {
        Filter::new()
            .greater_or_equal("datetime", self.start)
            .less_than("datetime", self.end)
    }
}

/// Reduced totals for one dimension value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregateRow {
    pub dimension_value: String,
    pub count: f64,
    pub revenue: f64,
}

/// Orders and revenue attributed to one campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CampaignMetrics {
    pub count: u64,
    pub revenue: f64,
}

/// Per-request join table from campaign id to its metrics
pub type MetricsByCampaignId = HashMap<String, CampaignMetrics>;

/// Which metric to look up, and where
#[derive(Debug, Clone)]
pub struct MetricFetcherConfig {
    /// Exact metric name to resolve
    pub metric_name: String,
    /// Integration source the catalog is filtered to
    pub integration_name: String,
}

impl Default for MetricFetcherConfig {
    fn default() -> Self {
        Self {
            metric_name: PLACED_ORDER_METRIC.to_string(),
            integration_name: DEFAULT_INTEGRATION.to_string(),
        }
    }
}

/// Fetches and reduces metric aggregates
pub struct MetricFetcher {
    api: Arc<dyn KlaviyoApi>,
    config: MetricFetcherConfig,
}

impl MetricFetcher {
    pub fn new(api: Arc<dyn KlaviyoApi>, config: MetricFetcherConfig) -> Self {
        Self { api, config }
    }

    /// Look up the configured metric's id in the integration's catalog
    pub async fn resolve_metric_id(&self) -> ReportResult<String> {
        let filter = Filter::new().equals("integration.name", self.config.integration_name.as_str());
        let metrics = self.api.list_metrics(&filter).await?;

        let id = find_metric_id(&metrics, &self.config.metric_name)?;
        tracing::debug!(metric = %self.config.metric_name, metric_id = %id, "Resolved metric");
        Ok(id)
    }

    /// Fetch raw aggregate rows for `metric_id` broken down by `dimension`
    pub async fn fetch_aggregate(
        &self,
        metric_id: &str,
        dimension: &str,
        window: &MetricWindow,
    ) -> ReportResult<Vec<AggregateRow>> {
        let query = MetricAggregateQuery {
            metric_id: metric_id.to_string(),
            by: vec![dimension.to_string()],
            measurements: vec![Measurement::Count, Measurement::SumValue],
            interval: Interval::Month,
            filter: window.filter(),
        };

        let rows = self.api.query_metric_aggregate(&query).await?;
        tracing::debug!(metric_id, dimension, rows = rows.len(), "Fetched metric aggregate");
        Ok(rows)
    }

    /// Resolve, fetch and reduce into a map keyed by dimension value
    pub async fn metrics_by_dimension(
        &self,
        dimension: &str,
        window: &MetricWindow,
    ) -> ReportResult<MetricsByCampaignId> {
        let metric_id = self.resolve_metric_id().await?;
        let rows = self.fetch_aggregate(&metric_id, dimension, window).await?;

        let mut metrics = MetricsByCampaignId::with_capacity(rows.len());
        for row in &rows {
            let reduced = reduce_row(row)?;
            metrics.insert(
                reduced.dimension_value,
                CampaignMetrics {
                    count: reduced.count as u64,
                    revenue: reduced.revenue,
                },
            );
        }

        Ok(metrics)
    }
}

/// Return the id of the first metric named `name`
pub fn find_metric_id(metrics: &[MetricSummary], name: &str) -> ReportResult<String> {
    metrics
        .iter()
        .find(|m| m.name == name)
        .map(|m| m.id.clone())
        .ok_or_else(|| ReportError::MetricNotFound(name.to_string()))
}

/// Collapse one raw aggregate row into totals
///
/// The first dimension value identifies the row.
pub fn reduce_row(row: &AggregateRow) -> ReportResult<MetricAggregateRow> {
    let dimension_value = row
        .dimensions
        .first()
        .cloned()
        .ok_or(ReportError::EmptyResult("metric aggregate dimensions"))?;

    let count = measurement_total(row, Measurement::Count)?;
    let revenue = measurement_total(row, Measurement::SumValue)?;

    Ok(MetricAggregateRow {
        dimension_value,
        count,
        revenue,
    })
}

fn measurement_total(row: &AggregateRow, kind: Measurement) -> ReportResult<f64> {
    let raw = row.measurements.get(kind.as_str()).ok_or_else(|| {
        ReportError::MeasurementDecode(format!("missing {} measurement", kind.as_str()))
    })?;
    Ok(MeasurementBuckets::decode(raw)?.total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klaviyo::fake::FakeKlaviyo;
    use chrono::TimeZone;
    use serde_json::json;

    fn summary(id: &str, name: &str) -> MetricSummary {
        MetricSummary {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn window() -> MetricWindow {
        let end = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        MetricWindow::trailing(end, TRAILING_WINDOW_DAYS).unwrap()
    }

    #[test]
    fn test_first_matching_metric_wins() {
        // Duplicate names resolve to whichever the upstream lists first
        let metrics = vec![
            summary("m0", "Viewed Product"),
            summary("m1", "Placed Order"),
            summary("m2", "Placed Order"),
        ];
        assert_eq!(find_metric_id(&metrics, PLACED_ORDER_METRIC).unwrap(), "m1");
    }

    #[test]
    fn test_missing_metric() {
        let metrics = vec![summary("m0", "Viewed Product"), summary("m1", "placed order")];
        let err = find_metric_id(&metrics, PLACED_ORDER_METRIC).unwrap_err();
        assert!(matches!(err, ReportError::MetricNotFound(name) if name == "Placed Order"));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert!(matches!(
            MetricWindow::new(t, t),
            Err(ReportError::InvalidWindow)
        ));
        assert!(matches!(
            MetricWindow::trailing(t, 0),
            Err(ReportError::InvalidWindow)
        ));
    }

    #[test]
    fn test_window_filter() {
        assert_eq!(
            window().filter().to_string(),
            "greater-or-equal(datetime,2024-02-14T12:00:00Z),less-than(datetime,2024-03-15T12:00:00Z)"
        );
    }

    #[test]
    fn test_reduce_row_sums_split_months() {
        let fake = FakeKlaviyo::new().aggregate_row("c1", &[3.0, 2.0], &[120.5, 79.5]);
        let row = reduce_row(&fake.aggregate[0]).unwrap();
        assert_eq!(row.dimension_value, "c1");
        assert_eq!(row.count, 5.0);
        assert_eq!(row.revenue, 200.0);
    }

    #[test]
    fn test_reduce_row_missing_measurement() {
        let mut fake = FakeKlaviyo::new().aggregate_row("c1", &[1.0], &[10.0]);
        fake.aggregate[0].measurements.remove("sum_value");
        let err = reduce_row(&fake.aggregate[0]).unwrap_err();
        assert!(matches!(err, ReportError::MeasurementDecode(_)));
    }

    #[tokio::test]
    async fn test_metrics_by_dimension() {
        let fake = Arc::new(
            FakeKlaviyo::new()
                .metric("m1", "Placed Order")
                .aggregate_row("c1", &[2.0], &[50.0])
                .aggregate_row("c2", &[1.0, 1.0], &[10.0, 15.0]),
        );
        let fetcher = MetricFetcher::new(fake.clone(), MetricFetcherConfig::default());

        let metrics = fetcher
            .metrics_by_dimension(ATTRIBUTED_MESSAGE_DIMENSION, &window())
            .await
            .unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["c1"], CampaignMetrics { count: 2, revenue: 50.0 });
        assert_eq!(metrics["c2"], CampaignMetrics { count: 2, revenue: 25.0 });

        assert_eq!(
            fake.metric_filters.lock().unwrap().as_slice(),
            &["equals(integration.name,'Shopify')".to_string()]
        );

        let queries = fake.aggregate_queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].metric_id, "m1");
        assert_eq!(queries[0].by, vec![ATTRIBUTED_MESSAGE_DIMENSION.to_string()]);
        assert_eq!(
            queries[0].measurements,
            vec![Measurement::Count, Measurement::SumValue]
        );
        assert_eq!(queries[0].interval, Interval::Month);
        assert_eq!(queries[0].filter, window().filter());
    }

    #[tokio::test]
    async fn test_metric_not_found_skips_aggregate_query() {
        let fake = Arc::new(FakeKlaviyo::new().metric("m0", "Active on Site"));
        let fetcher = MetricFetcher::new(fake.clone(), MetricFetcherConfig::default());

        let err = fetcher
            .metrics_by_dimension(ATTRIBUTED_MESSAGE_DIMENSION, &window())
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::MetricNotFound(_)));
        assert_eq!(fake.calls(), vec!["list_metrics"]);
    }

    #[tokio::test]
    async fn test_bad_bucket_aborts() {
        let mut fake = FakeKlaviyo::new()
            .metric("m1", "Placed Order")
            .aggregate_row("c1", &[1.0], &[10.0]);
        fake.aggregate[0]
            .measurements
            .insert("count".to_string(), json!([1.0, "two"]));
        let fetcher = MetricFetcher::new(Arc::new(fake), MetricFetcherConfig::default());

        let err = fetcher
            .metrics_by_dimension(ATTRIBUTED_MESSAGE_DIMENSION, &window())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MeasurementDecode(_)));
    }
}
