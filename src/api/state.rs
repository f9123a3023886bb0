//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::klaviyo::KlaviyoApi;
use crate::report::{ReportBuilder, DEFAULT_CURRENCY_SYMBOL};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Klaviyo API, for account lookups
    pub klaviyo: Arc<dyn KlaviyoApi>,
    /// Report assembler
    pub reports: Arc<ReportBuilder>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(klaviyo: Arc<dyn KlaviyoApi>, reports: Arc<ReportBuilder>, config: ApiConfig) -> Self {
        Self {
            klaviyo,
            reports,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Value callers must pass as `?api_key=`
    pub access_key: String,
    /// Symbol used for formatted monetary values
    pub currency_symbol: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            access_key: String::new(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
