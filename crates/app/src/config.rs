//! Environment configuration.

use std::time::Duration;

use stockdesk_client::{ClientError, DEFAULT_TIMEOUT, HttpBackend};

pub const API_URL_ENV: &str = "STOCKDESK_API_URL";
pub const AUTH_TOKEN_ENV: &str = "STOCKDESK_AUTH_TOKEN";
pub const TIMEOUT_ENV: &str = "STOCKDESK_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{TIMEOUT_ENV} must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get(API_URL_ENV).unwrap_or_else(|| {
            tracing::debug!("{API_URL_ENV} not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let timeout = match get(TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url,
            token: get(AUTH_TOKEN_ENV),
            timeout,
        })
    }

    /// Command-line values win over the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if token.is_some() {
            self.token = token;
        }
        self
    }

    pub fn http_backend(&self) -> Result<HttpBackend, ClientError> {
        if self.token.is_some() {
            tracing::info!("using authenticated backend client");
        } else {
            tracing::info!("using backend client without authentication token");
        }
        HttpBackend::with_options(self.api_url.clone(), self.token.clone(), self.timeout)
    }
}
