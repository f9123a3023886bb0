//! Wire types for the Klaviyo JSON:API envelopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    AccountSummary, AggregateRow, CampaignSummary, Interval, Measurement, MetricAggregateQuery,
    MetricSummary,
};

// ============================================
// Responses
// ============================================

/// Top-level `{ "data": ... }` document
#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource<A> {
    pub id: String,
    pub attributes: A,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricAttributes {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateResource {
    pub attributes: AggregateAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateAttributes {
    #[serde(default)]
    pub data: Vec<AggregateData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateData {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub measurements: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CampaignAttributes {
    pub name: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecipientEstimationAttributes {
    pub estimated_recipient_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountAttributes {
    pub contact_information: ContactInformation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactInformation {
    #[serde(default)]
    pub organization_name: String,
}

impl From<Resource<CampaignAttributes>> for CampaignSummary {
    fn from(r: Resource<CampaignAttributes>) -> Self {
        CampaignSummary {
            id: r.id,
            name: r.attributes.name,
            scheduled_at: r.attributes.scheduled_at,
        }
    }
}

impl From<Resource<AccountAttributes>> for AccountSummary {
    fn from(r: Resource<AccountAttributes>) -> Self {
        AccountSummary {
            id: r.id,
            organization_name: r.attributes.contact_information.organization_name,
        }
    }
}

impl From<AggregateData> for AggregateRow {
    fn from(d: AggregateData) -> Self {
        AggregateRow {
            dimensions: d.dimensions,
            measurements: d.measurements,
        }
    }
}

/// Metrics without a name can never match a lookup, so they are dropped here.
pub(crate) fn metric_summaries(resources: Vec<Resource<MetricAttributes>>) -> Vec<MetricSummary> {
    resources
        .into_iter()
        .filter_map(|r| {
            r.attributes.name.map(|name| MetricSummary { id: r.id, name })
        })
        .collect()
}

// ============================================
// Requests
// ============================================

#[derive(Debug, Serialize)]
pub(crate) struct AggregateRequest {
    pub data: AggregateRequestData,
}

#[derive(Debug, Serialize)]
pub(crate) struct AggregateRequestData {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: AggregateRequestAttributes,
}

#[derive(Debug, Serialize)]
pub(crate) struct AggregateRequestAttributes {
    pub metric_id: String,
    pub measurements: Vec<Measurement>,
    pub interval: Interval,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by: Vec<String>,
    pub filter: Vec<String>,
}

impl From<&MetricAggregateQuery> for AggregateRequest {
    fn from(q: &MetricAggregateQuery) -> Self {
        let filter = if q.filter.is_empty() {
            Vec::new()
        } else {
            vec![q.filter.to_string()]
        };

        AggregateRequest {
            data: AggregateRequestData {
                kind: "metric-aggregate",
                attributes: AggregateRequestAttributes {
                    metric_id: q.metric_id.clone(),
                    measurements: q.measurements.clone(),
                    interval: q.interval,
                    by: q.by.clone(),
                    filter,
                },
            },
        }
    }
}
