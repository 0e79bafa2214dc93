//! Centralized configuration management for docsubmit

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::validation::ValidationOptions;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the collection service; `/upload` and `/submit` hang off it
    pub api_base_url: String,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Enforce permanent address when it differs from the residential one
    pub require_permanent_address: bool,
    /// Log file written by both front ends
    pub log_file: PathBuf,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds; unset leaves the transport default
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpConfig::default(),
            require_permanent_address: false,
            log_file: PathBuf::from("docsubmit.log"),
        }
    }
}

fn default_user_agent() -> String {
    format!("docsubmit/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("DOCSUBMIT_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let http = HttpConfig {
            timeout_seconds: parse_env_var("DOCSUBMIT_HTTP_TIMEOUT_SECONDS")?,
            user_agent: std::env::var("DOCSUBMIT_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
        };

        let require_permanent_address =
            parse_env_var("DOCSUBMIT_REQUIRE_PERMANENT_ADDRESS")?.unwrap_or(false);

        let log_file = std::env::var("DOCSUBMIT_LOG_FILE")
            .unwrap_or_else(|_| "docsubmit.log".to_string())
            .into();

        Ok(Config {
            api_base_url,
            http,
            require_permanent_address,
            log_file,
        })
    }

    /// Replace the base URL, e.g. from a command line flag
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.api_base_url = url;
        }
        self
    }

    /// Endpoint URL for `path` under the base address
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http.timeout_seconds.map(Duration::from_secs)
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            require_permanent_address: self.require_permanent_address,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "API base URL must use http or https: {}",
                self.api_base_url
            ));
        }

        if self.http.timeout_seconds == Some(0) {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
