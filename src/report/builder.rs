//! Report Assembler
//!
//! Builds the campaign performance report:
//!
//! 1. List eligible campaigns
//! 2. Fetch the conversion metric aggregate by `$attributed_message`
//! 3. Fetch each campaign's recipient estimate
//! 4. Join on campaign id and compute the derived ratios
//!
//! Nothing is cached between reports: every build repeats the campaign and
//! metric calls plus one recipient estimate call per campaign.
//!
//! A failed recipient estimate fails the whole report, including for campaigns
//! that would later be skipped for lack of metrics. A campaign missing from the
//! metrics map is only skipped with a warning.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;

use super::campaigns::{Campaign, CampaignEnumerator};
use super::error::{ReportError, ReportResult};
use super::metrics::{
    MetricFetcher, MetricFetcherConfig, MetricWindow, MetricsByCampaignId,
    ATTRIBUTED_MESSAGE_DIMENSION, TRAILING_WINDOW_DAYS,
};
use super::row::ReportRow;
use crate::klaviyo::{CampaignSummary, KlaviyoApi};

/// Report assembly settings
#[derive(Debug, Clone)]
pub struct ReportBuilderConfig {
    /// Recipient estimates in flight at once; 1 fetches them one by one
    pub recipient_concurrency: usize,
}

impl Default for ReportBuilderConfig {
    fn default() -> Self {
        Self {
            recipient_concurrency: 4,
        }
    }
}

/// Assembles campaign performance reports
pub struct ReportBuilder {
    enumerator: CampaignEnumerator,
    fetcher: MetricFetcher,
    config: ReportBuilderConfig,
}

impl ReportBuilder {
    pub fn new(
        api: Arc<dyn KlaviyoApi>,
        metric_config: MetricFetcherConfig,
        config: ReportBuilderConfig,
    ) -> Self {
        Self {
            enumerator: CampaignEnumerator::new(Arc::clone(&api)),
            fetcher: MetricFetcher::new(api, metric_config),
            config,
        }
    }

    /// Build the report as of `as_of`
    ///
    /// Campaigns scheduled before `as_of` are included and metrics cover the
    /// 30 days ending at `as_of`. Rows keep the upstream campaign order.
    pub async fn build_report(&self, as_of: DateTime<Utc>) -> ReportResult<Vec<ReportRow>> {
        let started = Instant::now();

        let summaries = self.enumerator.list_eligible_campaigns(as_of).await?;

        let window = MetricWindow::trailing(as_of, TRAILING_WINDOW_DAYS)?;
        let metrics = self
            .fetcher
            .metrics_by_dimension(ATTRIBUTED_MESSAGE_DIMENSION, &window)
            .await?;

        let campaigns = self.estimate_all(summaries).await?;
        let campaign_count = campaigns.len();
        let rows = join_metrics(campaigns, &metrics);

        tracing::info!(
            campaigns = campaign_count,
            rows = rows.len(),
            skipped = campaign_count - rows.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Built campaign report"
        );

        Ok(rows)
    }

    /// Fetch recipient estimates, keeping input order
    async fn estimate_all(&self, summaries: Vec<CampaignSummary>) -> ReportResult<Vec<Campaign>> {
        let enumerator = &self.enumerator;

        stream::iter(summaries)
            .map(|summary| async move {
                let count = enumerator.estimate_recipients(&summary.id).await?;
                Ok::<_, ReportError>(Campaign {
                    id: summary.id,
                    name: summary.name,
                    estimated_recipient_count: count,
                })
            })
            .buffered(self.config.recipient_concurrency.max(1))
            .try_collect()
            .await
    }
}

/// Join campaigns with their metrics, dropping campaigns that have none
pub fn join_metrics(campaigns: Vec<Campaign>, metrics: &MetricsByCampaignId) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(campaigns.len());

    for campaign in campaigns {
        match metrics.get(&campaign.id) {
            Some(m) => rows.push(ReportRow::compute(
                campaign.name,
                *m,
                campaign.estimated_recipient_count,
            )),
            None => {
                tracing::warn!(campaign_id = %campaign.id, "No metrics for campaign, skipping");
            }
        }
    }

    rows
}
