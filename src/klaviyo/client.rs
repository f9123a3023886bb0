//! Klaviyo REST API Client
//!
//! HTTP client for the Klaviyo JSON:API endpoints used by the report.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::{
    metric_summaries, AccountAttributes, AggregateRequest, AggregateResource, CampaignAttributes,
    Document, MetricAttributes, RecipientEstimationAttributes, Resource,
};
use super::{
    AccountSummary, AggregateRow, CampaignSummary, Filter, KlaviyoApi, KlaviyoError,
    MetricAggregateQuery, MetricSummary,
};

pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com";

/// API revision every request is pinned to
pub const DEFAULT_REVISION: &str = "2023-12-15";

/// Klaviyo REST API client
pub struct KlaviyoClient {
    client: Client,
    config: KlaviyoConfig,
}

/// Configuration for the Klaviyo client
#[derive(Debug, Clone)]
pub struct KlaviyoConfig {
    /// Base URL (e.g., "https://a.klaviyo.com")
    pub base_url: String,
    /// Private API key
    pub api_key: String,
    /// Value of the `revision` header
    pub revision: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for KlaviyoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            revision: DEFAULT_REVISION.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl KlaviyoClient {
    /// Create a new client with the given configuration
    pub fn new(config: KlaviyoConfig) -> Result<Self, KlaviyoError> {
        let client = Client::builder()
            .user_agent(concat!("campaign-report/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Klaviyo-API-Key {}", self.config.api_key),
            )
            .header("revision", &self.config.revision)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        path: &str,
        filter: Option<&Filter>,
        resource: &'static str,
    ) -> Result<T, KlaviyoError> {
        let mut request = self.authorized(self.client.get(self.url(path)));
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            request = request.query(&[("filter", filter.to_string())]);
        }

        let response = request.send().await.map_err(KlaviyoError::from_send)?;
        read_document(response, resource).await
    }
}

/// Check the status and unwrap the `data` member of a response
async fn read_document<T: DeserializeOwned>(
    response: Response,
    resource: &'static str,
) -> Result<T, KlaviyoError> {
    let status = response.status();
    tracing::debug!(resource, status = status.as_u16(), "Klaviyo response");

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(KlaviyoError::Api {
            status: status.as_u16(),
            message,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Err(KlaviyoError::EmptyBody { resource });
    }

    let body = response.bytes().await.map_err(KlaviyoError::from_send)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(KlaviyoError::EmptyBody { resource });
    }

    let document: Document<T> =
        serde_json::from_slice(&body).map_err(|e| KlaviyoError::Decode(e.to_string()))?;

    document.data.ok_or(KlaviyoError::EmptyBody { resource })
}

#[async_trait]
impl KlaviyoApi for KlaviyoClient {
    async fn list_metrics(&self, filter: &Filter) -> Result<Vec<MetricSummary>, KlaviyoError> {
        let resources: Vec<Resource<MetricAttributes>> = self
            .get_document("/api/metrics/", Some(filter), "metrics")
            .await?;
        Ok(metric_summaries(resources))
    }

    async fn query_metric_aggregate(
        &self,
        query: &MetricAggregateQuery,
    ) -> Result<Vec<AggregateRow>, KlaviyoError> {
        let body = AggregateRequest::from(query);

        let response = self
            .authorized(self.client.post(self.url("/api/metric-aggregates/")))
            .json(&body)
            .send()
            .await
            .map_err(KlaviyoError::from_send)?;

        let resource: AggregateResource = read_document(response, "metric-aggregates").await?;
        Ok(resource
            .attributes
            .data
            .into_iter()
            .map(AggregateRow::from)
            .collect())
    }

    async fn list_campaigns(&self, filter: &Filter) -> Result<Vec<CampaignSummary>, KlaviyoError> {
        let resources: Vec<Resource<CampaignAttributes>> = self
            .get_document("/api/campaigns/", Some(filter), "campaigns")
            .await?;
        Ok(resources.into_iter().map(Into::into).collect())
    }

    async fn estimate_campaign_recipients(&self, campaign_id: &str) -> Result<u64, KlaviyoError> {
        let path = format!(
            "/api/campaign-recipient-estimations/{}/",
            urlencoding::encode(campaign_id)
        );
        let resource: Resource<RecipientEstimationAttributes> = self
            .get_document(&path, None, "campaign-recipient-estimations")
            .await?;
        Ok(resource.attributes.estimated_recipient_count)
    }

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, KlaviyoError> {
        let resources: Vec<Resource<AccountAttributes>> =
            self.get_document("/api/accounts/", None, "accounts").await?;
        Ok(resources.into_iter().map(Into::into).collect())
    }

    async fn get_account(&self, account_id: &str) -> Result<AccountSummary, KlaviyoError> {
        let path = format!("/api/accounts/{}/", urlencoding::encode(account_id));
        let resource: Resource<AccountAttributes> =
            self.get_document(&path, None, "account").await?;
        Ok(resource.into())
    }
}
