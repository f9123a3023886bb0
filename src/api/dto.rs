//! Data Transfer Objects
//!
//! Response types for the API endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::klaviyo::AccountSummary;
use crate::report::{format_currency, format_percent, ReportRow};

// ============================================
// ACCOUNT DTOs
// ============================================

/// An account with a link to its report
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: String,
    pub name: String,
    /// Report path including the access key
    pub report_url: String,
}

impl AccountDto {
    pub fn new(account: AccountSummary, access_key: &str) -> Self {
        let report_url = format!(
            "/api/v1/reports/{}?api_key={}",
            urlencoding::encode(&account.id),
            urlencoding::encode(access_key)
        );

        Self {
            id: account.id,
            name: account.organization_name,
            report_url,
        }
    }
}

/// Account list response
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountDto>,
}

// ============================================
// REPORT DTOs
// ============================================

/// Campaign performance report response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub account_id: String,
    pub account_name: String,
    /// RFC 3339 instant the report was computed for
    pub generated_at: String,
    pub currency: String,
    pub campaigns: Vec<CampaignRowDto>,
}

impl ReportResponse {
    pub fn new(
        account: AccountSummary,
        generated_at: DateTime<Utc>,
        rows: Vec<ReportRow>,
        currency: &str,
    ) -> Self {
        Self {
            account_id: account.id,
            account_name: account.organization_name,
            generated_at: generated_at.to_rfc3339(),
            currency: currency.to_string(),
            campaigns: rows
                .into_iter()
                .map(|row| CampaignRowDto::new(row, currency))
                .collect(),
        }
    }
}

/// A report row with display strings alongside the raw values
#[derive(Debug, Serialize)]
pub struct CampaignRowDto {
    #[serde(flatten)]
    pub row: ReportRow,
    pub display: DisplayValues,
}

impl CampaignRowDto {
    pub fn new(row: ReportRow, currency: &str) -> Self {
        let display = DisplayValues {
            conversion_rate: format_percent(row.conversion_rate),
            conversion_value: format_currency(row.conversion_value, currency),
            revenue_per_recipient: format_currency(row.revenue_per_recipient, currency),
        };
        Self { row, display }
    }
}

/// Formatted ratio columns
#[derive(Debug, Serialize)]
pub struct DisplayValues {
    pub conversion_rate: String,
    pub conversion_value: String,
    pub revenue_per_recipient: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Ping response
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_report_url_is_encoded() {
        let account = AccountSummary {
            id: "XyZ123".to_string(),
            organization_name: "Acme".to_string(),
        };
        let dto = AccountDto::new(account, "a key&more");
        assert_eq!(dto.report_url, "/api/v1/reports/XyZ123?api_key=a%20key%26more");
        assert_eq!(dto.name, "Acme");
    }

    #[test]
    fn test_row_display_values() {
        let row = ReportRow {
            name: "Spring Sale".to_string(),
            total_recipients: 1000,
            orders_placed: 10,
            conversion_rate: 0.01,
            conversion_value: 50.0,
            revenue_per_recipient: 0.5,
        };

        let json = serde_json::to_value(CampaignRowDto::new(row, "€")).unwrap();
        assert_eq!(json["name"], "Spring Sale");
        assert_eq!(json["orders_placed"], 10);
        assert_eq!(json["display"]["conversion_rate"], "1.0000%");
        assert_eq!(json["display"]["conversion_value"], "€50.00");
        assert_eq!(json["display"]["revenue_per_recipient"], "€0.50");
    }
}
