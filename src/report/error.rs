//! Report error types
//!
//! Every variant is fatal for the report being built. The only non-fatal
//! condition (a campaign with no metrics) is logged and skipped instead.

use thiserror::Error;

use crate::klaviyo::KlaviyoError;

/// Errors that can occur while building a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// No upstream metric carries the configured name
    #[error("Metric not found: {0}")]
    MetricNotFound(String),

    /// Transport failure or non-success response from Klaviyo
    #[error("Upstream error: {0}")]
    Upstream(KlaviyoError),

    /// A measurement bucket was not numeric
    #[error("Measurement decode error: {0}")]
    MeasurementDecode(String),

    /// An expected payload was absent
    #[error("Empty result for {0}")]
    EmptyResult(&'static str),

    /// Window start must be before window end
    #[error("Invalid metric window: start must be before end")]
    InvalidWindow,
}

impl From<KlaviyoError> for ReportError {
    fn from(err: KlaviyoError) -> Self {
        match err {
            KlaviyoError::EmptyBody { resource } => ReportError::EmptyResult(resource),
            other => ReportError::Upstream(other),
        }
    }
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::MetricNotFound("Placed Order".to_string());
        assert_eq!(err.to_string(), "Metric not found: Placed Order");

        let err = ReportError::EmptyResult("campaigns");
        assert_eq!(err.to_string(), "Empty result for campaigns");
    }

    #[test]
    fn test_klaviyo_error_conversion() {
        let err: ReportError = KlaviyoError::EmptyBody {
            resource: "metric-aggregates",
        }
        .into();
        assert!(matches!(err, ReportError::EmptyResult("metric-aggregates")));

        let err: ReportError = KlaviyoError::Timeout.into();
        assert!(matches!(err, ReportError::Upstream(KlaviyoError::Timeout)));

        let err: ReportError = KlaviyoError::Api {
            status: 503,
            message: "down".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ReportError::Upstream(KlaviyoError::Api { status: 503, .. })
        ));
    }
}
