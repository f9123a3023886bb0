//! Klaviyo Integration
//!
//! The email-marketing platform the reports are computed from.
//!
//! - [`KlaviyoApi`]: the capability the report core consumes
//! - [`KlaviyoClient`]: HTTP implementation against the public REST API
//! - [`Filter`]: builder for the upstream filter-expression grammar

mod client;
mod dto;
mod filter;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{KlaviyoClient, KlaviyoConfig, DEFAULT_BASE_URL, DEFAULT_REVISION};
pub use filter::{Filter, FilterValue};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Operations the report core needs from the platform
#[async_trait]
pub trait KlaviyoApi: Send + Sync {
    /// List metrics matching `filter`, in upstream order
    async fn list_metrics(&self, filter: &Filter) -> Result<Vec<MetricSummary>, KlaviyoError>;

    /// Run a metric aggregate query
    async fn query_metric_aggregate(
        &self,
        query: &MetricAggregateQuery,
    ) -> Result<Vec<AggregateRow>, KlaviyoError>;

    /// List campaigns matching `filter`, in upstream order
    async fn list_campaigns(&self, filter: &Filter) -> Result<Vec<CampaignSummary>, KlaviyoError>;

    /// Estimated recipient count for one campaign
    async fn estimate_campaign_recipients(&self, campaign_id: &str) -> Result<u64, KlaviyoError>;

    /// Accounts visible to the configured API key
    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, KlaviyoError>;

    /// A single account by id
    async fn get_account(&self, account_id: &str) -> Result<AccountSummary, KlaviyoError>;
}

/// A metric in the upstream catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub id: String,
    pub name: String,
}

/// Measurement kinds requested from the aggregate endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Count,
    SumValue,
}

impl Measurement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Count => "count",
            Measurement::SumValue => "sum_value",
        }
    }
}

/// Bucket interval for aggregate queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Month,
}

/// A metric aggregate request
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAggregateQuery {
    pub metric_id: String,
    pub by: Vec<String>,
    pub measurements: Vec<Measurement>,
    pub interval: Interval,
    pub filter: Filter,
}

/// One row of an aggregate response, undecoded
///
/// Measurement values are kept as raw JSON; the report core validates them.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub dimensions: Vec<String>,
    pub measurements: HashMap<String, serde_json::Value>,
}

/// A campaign as listed upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// An account visible to the API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub organization_name: String,
}

/// Errors returned by the Klaviyo API client
#[derive(Error, Debug)]
pub enum KlaviyoError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Klaviyo unavailable")]
    Unavailable,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Response for {resource} had no data")]
    EmptyBody { resource: &'static str },
}

impl KlaviyoError {
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            KlaviyoError::Timeout
        } else if e.is_connect() {
            KlaviyoError::Unavailable
        } else {
            KlaviyoError::Request(e)
        }
    }
}
