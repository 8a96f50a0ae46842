//! Configuration parsing for the Doraemon quant client.
//!
//! All settings come from a single JSON file. Every section and field has a
//! default, so an empty object (`{}`) is a valid config that talks to a
//! backend on `http://127.0.0.1:8000/api/v1`.
//!
//! # Example config
//!
//! ```json
//! {
//!   "api": { "base_url": "http://quant.local:8000", "timeout_secs": 30 },
//!   "store": { "job_fetch_limit": 20, "default_market": "US" },
//!   "logging": { "module_name": "dora", "log_level": "debug", "log_path": "/tmp/log" }
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::types::{DEFAULT_JOB_FETCH_LIMIT, DEFAULT_MARKET, DEFAULT_PAGE_SIZE};

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP client adapter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the versioned API (health lives outside it).
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout. Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Base URL of the versioned API, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }
}

/// Store defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Size of the recent-jobs list.
    #[serde(default = "default_job_fetch_limit")]
    pub job_fetch_limit: usize,

    /// Market used by the initial search filter.
    #[serde(default = "default_market")]
    pub default_market: String,

    /// Page size used by the initial search filter.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Interval between status polls while waiting on a job.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up waiting on a job after this long.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            job_fetch_limit: default_job_fetch_limit(),
            default_market: default_market(),
            default_page_size: default_page_size(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_secs: default_wait_timeout_secs(),
        }
    }
}

/// Logging metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log file prefix.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for daily-rotating log files.
    #[serde(default)]
    pub log_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            log_level: default_log_level(),
            log_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default helpers (used by serde)
// ---------------------------------------------------------------------------

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_api_prefix() -> String {
    "/api/v1".into()
}

fn default_job_fetch_limit() -> usize {
    DEFAULT_JOB_FETCH_LIMIT
}

fn default_market() -> String {
    DEFAULT_MARKET.into()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_wait_timeout_secs() -> u64 {
    600
}

fn default_module_name() -> String {
    "dora".into()
}

fn default_log_level() -> String {
    "info".into()
}

/// Load and parse a JSON config file.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api.api_root(), "http://127.0.0.1:8000/api/v1");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.store.job_fetch_limit, 50);
        assert_eq!(config.store.default_market, "CN");
        assert_eq!(config.store.default_page_size, 20);
        assert_eq!(config.logging.module_name, "dora");
        assert!(config.logging.log_path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"api": {"base_url": "http://quant.local:9000/", "timeout_secs": 5},
                "store": {"job_fetch_limit": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.api.api_root(), "http://quant.local:9000/api/v1");
        assert_eq!(config.api.timeout_secs, Some(5));
        assert_eq!(config.store.job_fetch_limit, 10);
        assert_eq!(config.store.poll_interval_ms, 2000);
    }

    #[test]
    fn empty_prefix_joins_cleanly() {
        let api = ApiConfig {
            base_url: "http://h:1".into(),
            api_prefix: "".into(),
            timeout_secs: None,
        };
        assert_eq!(api.api_root(), "http://h:1");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/dora.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dora.json"));
    }
}
