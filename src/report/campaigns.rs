//! Campaign Enumerator
//!
//! Lists email campaigns that are unarchived and were scheduled before the
//! report instant, and looks up each one's estimated recipient count.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::error::ReportResult;
use crate::klaviyo::{CampaignSummary, Filter, KlaviyoApi};

/// A campaign with its recipient estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub estimated_recipient_count: u64,
}

pub struct CampaignEnumerator {
    api: Arc<dyn KlaviyoApi>,
}

impl CampaignEnumerator {
    pub fn new(api: Arc<dyn KlaviyoApi>) -> Self {
        Self { api }
    }

    /// Campaigns eligible for reporting as of `as_of`, in upstream order
    ///
    /// All filtering happens upstream.
    pub async fn list_eligible_campaigns(
        &self,
        as_of: DateTime<Utc>,
    ) -> ReportResult<Vec<CampaignSummary>> {
        let campaigns = self.api.list_campaigns(&eligible_filter(as_of)).await?;
        tracing::debug!(count = campaigns.len(), %as_of, "Listed eligible campaigns");
        Ok(campaigns)
    }

    /// Estimated recipient count for one campaign
    pub async fn estimate_recipients(&self, campaign_id: &str) -> ReportResult<u64> {
        let count = self.api.estimate_campaign_recipients(campaign_id).await?;
        tracing::trace!(campaign_id, count, "Recipient estimate");
        Ok(count)
    }
}

/// `equals(messages.channel,'email'),equals(archived,false),less-than(scheduled_at,<as_of>)`
pub fn eligible_filter(as_of: DateTime<Utc>) -> Filter {
    Filter::new()
        .equals("messages.channel", "email")
        .equals("archived", false)
        .less_than("scheduled_at", as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klaviyo::fake::FakeKlaviyo;
    use crate::report::ReportError;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_list_eligible_campaigns_uses_filter() {
        let fake = Arc::new(
            FakeKlaviyo::new()
                .campaign("c1", "Spring Sale", 1000)
                .campaign("c2", "Newsletter", 500),
        );
        let enumerator = CampaignEnumerator::new(fake.clone());
        let as_of = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();

        let campaigns = enumerator.list_eligible_campaigns(as_of).await.unwrap();

        let ids: Vec<&str> = campaigns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(
            fake.campaign_filters.lock().unwrap()[0],
            "equals(messages.channel,'email'),equals(archived,false),less-than(scheduled_at,2024-03-15T08:00:00Z)"
        );
    }

    #[tokio::test]
    async fn test_list_failure_is_upstream_error() {
        let mut fake = FakeKlaviyo::new();
        fake.fail_campaigns = true;
        let enumerator = CampaignEnumerator::new(Arc::new(fake));

        let err = enumerator
            .list_eligible_campaigns(Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_estimate_recipients() {
        let fake = FakeKlaviyo::new()
            .campaign("c1", "Spring Sale", 1000)
            .campaign("c2", "Broken", 10)
            .failing_estimate("c2");
        let enumerator = CampaignEnumerator::new(Arc::new(fake));

        assert_eq!(enumerator.estimate_recipients("c1").await.unwrap(), 1000);
        assert!(matches!(
            enumerator.estimate_recipients("c2").await,
            Err(ReportError::Upstream(_))
        ));
    }
}
