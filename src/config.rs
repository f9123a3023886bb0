//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::klaviyo::{KlaviyoConfig, DEFAULT_BASE_URL, DEFAULT_REVISION};
use crate::report::{
    MetricFetcherConfig, ReportBuilderConfig, DEFAULT_CURRENCY_SYMBOL, DEFAULT_INTEGRATION,
    PLACED_ORDER_METRIC,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub klaviyo: KlaviyoSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub report: ReportSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Klaviyo API access
#[derive(Debug, Clone, Deserialize)]
pub struct KlaviyoSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_revision")]
    pub revision: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_revision() -> String {
    DEFAULT_REVISION.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for KlaviyoSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            revision: default_revision(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl KlaviyoSettings {
    pub fn client_config(&self) -> KlaviyoConfig {
        KlaviyoConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            revision: self.revision.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Key callers must pass as `?api_key=`
    #[serde(default)]
    pub access_key: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            access_key: String::new(),
        }
    }
}

/// Report computation settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_metric_name")]
    pub metric_name: String,

    #[serde(default = "default_integration_name")]
    pub integration_name: String,

    #[serde(default = "default_recipient_concurrency")]
    pub recipient_concurrency: usize,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_metric_name() -> String {
    PLACED_ORDER_METRIC.to_string()
}

fn default_integration_name() -> String {
    DEFAULT_INTEGRATION.to_string()
}

fn default_recipient_concurrency() -> usize {
    4
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            metric_name: default_metric_name(),
            integration_name: default_integration_name(),
            recipient_concurrency: default_recipient_concurrency(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl ReportSettings {
    pub fn metric_config(&self) -> MetricFetcherConfig {
        MetricFetcherConfig {
            metric_name: self.metric_name.clone(),
            integration_name: self.integration_name.clone(),
        }
    }

    pub fn builder_config(&self) -> ReportBuilderConfig {
        ReportBuilderConfig {
            recipient_concurrency: self.recipient_concurrency,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("campaign-report").join("config.toml")),
            Some(PathBuf::from("/etc/campaign-report/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check the settings the service cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.klaviyo.api_key.is_empty() {
            return Err(ConfigError::Missing("KLAVIYO_API_KEY"));
        }
        if self.server.access_key.is_empty() {
            return Err(ConfigError::Missing("CAMPAIGN_REPORT_API_KEY"));
        }
        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            access_key: self.server.access_key.clone(),
            currency_symbol: self.report.currency_symbol.clone(),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Klaviyo overrides
        if let Some(key) = var("KLAVIYO_API_KEY") {
            self.klaviyo.api_key = key;
        }
        if let Some(url) = var("KLAVIYO_BASE_URL") {
            self.klaviyo.base_url = url;
        }

        // Server overrides
        if let Some(key) = var("CAMPAIGN_REPORT_API_KEY") {
            self.server.access_key = key;
        }
        if let Some(host) = var("CAMPAIGN_REPORT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CAMPAIGN_REPORT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("CAMPAIGN_REPORT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CAMPAIGN_REPORT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("{0} not set")]
    Missing(&'static str),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Campaign Report Configuration
#
# Environment variables override these settings:
# - KLAVIYO_API_KEY
# - KLAVIYO_BASE_URL
# - CAMPAIGN_REPORT_API_KEY
# - CAMPAIGN_REPORT_HOST
# - CAMPAIGN_REPORT_PORT
# - CAMPAIGN_REPORT_LOG_LEVEL
# - CAMPAIGN_REPORT_LOG_FORMAT

[klaviyo]
# Private API key (prefer the KLAVIYO_API_KEY environment variable)
api_key = ""

# API base URL
base_url = "https://a.klaviyo.com"

# API revision header
revision = "2023-12-15"

# Request timeout in seconds
request_timeout_secs = 30

[server]
# HTTP server host
host = "0.0.0.0"

# HTTP server port
port = 8080

# Key callers must pass as ?api_key= (prefer CAMPAIGN_REPORT_API_KEY)
access_key = ""

[report]
# Conversion metric name, matched exactly
metric_name = "Placed Order"

# Integration the metric comes from
integration_name = "Shopify"

# Recipient estimate requests in flight at once
recipient_concurrency = 4

# Currency symbol for formatted values
currency_symbol = "€"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.klaviyo.base_url, "https://a.klaviyo.com");
        assert_eq!(config.klaviyo.revision, "2023-12-15");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.report.metric_name, "Placed Order");
        assert_eq!(config.report.integration_name, "Shopify");
        assert_eq!(config.report.recipient_concurrency, 4);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.report.currency_symbol, "€");
        assert!(config.klaviyo.api_key.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[klaviyo]\napi_key = \"pk_file\"\n\n[report]\nrecipient_concurrency = 1"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.klaviyo.api_key, "pk_file");
        assert_eq!(config.klaviyo.request_timeout_secs, 30);
        assert_eq!(config.report.recipient_concurrency, 1);
        assert_eq!(config.report.metric_name, "Placed Order");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KLAVIYO_API_KEY", "pk_env"),
            ("CAMPAIGN_REPORT_API_KEY", "secret"),
            ("CAMPAIGN_REPORT_PORT", "9000"),
            ("CAMPAIGN_REPORT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.klaviyo.api_key, "pk_env");
        assert_eq!(config.server.access_key, "secret");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_keys() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("KLAVIYO_API_KEY"))
        ));

        config.klaviyo.api_key = "pk".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("CAMPAIGN_REPORT_API_KEY"))
        ));
    }
}
