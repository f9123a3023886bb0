//! In-memory `KlaviyoApi` for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{
    AccountSummary, AggregateRow, CampaignSummary, Filter, KlaviyoApi, KlaviyoError,
    MetricAggregateQuery, MetricSummary,
};

/// Canned responses plus a record of what was asked
#[derive(Default)]
pub(crate) struct FakeKlaviyo {
    pub metrics: Vec<MetricSummary>,
    pub aggregate: Vec<AggregateRow>,
    pub campaigns: Vec<CampaignSummary>,
    pub estimates: HashMap<String, u64>,
    pub accounts: Vec<AccountSummary>,
    /// Campaign ids whose estimate call fails
    pub failing_estimates: Vec<String>,
    pub fail_campaigns: bool,
    pub fail_metrics: bool,
    pub fail_aggregate: bool,
    /// Aggregate call answers with no `data`
    pub empty_aggregate: bool,
    /// Per-campaign latency of the estimate call
    pub estimate_delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
    /// Campaign ids in the order their estimate calls returned
    pub finished_estimates: Mutex<Vec<String>>,
    pub metric_filters: Mutex<Vec<String>>,
    pub campaign_filters: Mutex<Vec<String>>,
    pub aggregate_queries: Mutex<Vec<MetricAggregateQuery>>,
}

impl FakeKlaviyo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(mut self, id: &str, name: &str) -> Self {
        self.metrics.push(MetricSummary {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn campaign(mut self, id: &str, name: &str, recipients: u64) -> Self {
        self.campaigns.push(CampaignSummary {
            id: id.to_string(),
            name: name.to_string(),
            scheduled_at: None,
        });
        self.estimates.insert(id.to_string(), recipients);
        self
    }

    pub fn aggregate_row(mut self, campaign_id: &str, count: &[f64], revenue: &[f64]) -> Self {
        let mut measurements = HashMap::new();
        measurements.insert("count".to_string(), serde_json::json!(count));
        measurements.insert("sum_value".to_string(), serde_json::json!(revenue));
        self.aggregate.push(AggregateRow {
            dimensions: vec![campaign_id.to_string()],
            measurements,
        });
        self
    }

    pub fn account(mut self, id: &str, name: &str) -> Self {
        self.accounts.push(AccountSummary {
            id: id.to_string(),
            organization_name: name.to_string(),
        });
        self
    }

    pub fn failing_estimate(mut self, campaign_id: &str) -> Self {
        self.failing_estimates.push(campaign_id.to_string());
        self
    }

    pub fn estimate_delay(mut self, campaign_id: &str, millis: u64) -> Self {
        self.estimate_delays
            .insert(campaign_id.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn server_error() -> KlaviyoError {
    KlaviyoError::Api {
        status: 500,
        message: "internal".to_string(),
    }
}

#[async_trait]
impl KlaviyoApi for FakeKlaviyo {
    async fn list_metrics(&self, filter: &Filter) -> Result<Vec<MetricSummary>, KlaviyoError> {
        self.record("list_metrics".to_string());
        self.metric_filters.lock().unwrap().push(filter.to_string());
        if self.fail_metrics {
            return Err(server_error());
        }
        Ok(self.metrics.clone())
    }

    async fn query_metric_aggregate(
        &self,
        query: &MetricAggregateQuery,
    ) -> Result<Vec<AggregateRow>, KlaviyoError> {
        self.record("query_metric_aggregate".to_string());
        self.aggregate_queries.lock().unwrap().push(query.clone());
        if self.fail_aggregate {
            return Err(server_error());
        }
        if self.empty_aggregate {
            return Err(KlaviyoError::EmptyBody {
                resource: "metric-aggregates",
            });
        }
        Ok(self.aggregate.clone())
    }

    async fn list_campaigns(&self, filter: &Filter) -> Result<Vec<CampaignSummary>, KlaviyoError> {
        self.record("list_campaigns".to_string());
        self.campaign_filters.lock().unwrap().push(filter.to_string());
        if self.fail_campaigns {
            return Err(server_error());
        }
        Ok(self.campaigns.clone())
    }

    async fn estimate_campaign_recipients(&self, campaign_id: &str) -> Result<u64, KlaviyoError> {
        self.record(format!("estimate:{}", campaign_id));
        if let Some(delay) = self.estimate_delays.get(campaign_id) {
            tokio::time::sleep(*delay).await;
        }
        self.finished_estimates
            .lock()
            .unwrap()
            .push(campaign_id.to_string());
        if self.failing_estimates.iter().any(|id| id == campaign_id) {
            return Err(server_error());
        }
        self.estimates
            .get(campaign_id)
            .copied()
            .ok_or(KlaviyoError::EmptyBody {
                resource: "campaign-recipient-estimations",
            })
    }

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, KlaviyoError> {
        self.record("list_accounts".to_string());
        Ok(self.accounts.clone())
    }

    async fn get_account(&self, account_id: &str) -> Result<AccountSummary, KlaviyoError> {
        self.record(format!("get_account:{}", account_id));
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or(KlaviyoError::Api {
                status: 404,
                message: "account not found".to_string(),
            })
    }
}
