use std::time::Duration;

use super::cache::DEFAULT_CLEANUP_INTERVAL;
use crate::error::{ErrorCode, FeatureFlagError, Result};

pub const DEFAULT_BASE_URL: &str = "https://strong-lorena-07manan-b3c1d402.koyeb.app";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Environment variable consulted when no base URL is configured explicitly.
pub const BASE_URL_ENV_VAR: &str = "FEATUREFLAGS_BASE_URL";

/// Prefix every environment API key carries.
pub const API_KEY_PREFIX: &str = "ff_";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: String,
    /// Explicit evaluation endpoint; see [`ClientOptions::resolve_base_url`].
    pub base_url: Option<String>,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub cleanup_interval: Duration,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || !self.api_key.starts_with(API_KEY_PREFIX) {
            return Err(FeatureFlagError::config_error(
                ErrorCode::InvalidApiKey,
                "Invalid API key: must start with \"ff_\"",
            ));
        }

        if self.cache_ttl.is_zero() {
            return Err(FeatureFlagError::config_error(
                ErrorCode::InvalidConfig,
                "Cache TTL must be positive",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(FeatureFlagError::config_error(
                ErrorCode::InvalidConfig,
                "Request timeout must be positive",
            ));
        }

        if self.cleanup_interval.is_zero() {
            return Err(FeatureFlagError::config_error(
                ErrorCode::InvalidConfig,
                "Cleanup interval must be positive",
            ));
        }

        Ok(())
    }

    /// Base URL to use, in priority order: explicit option, then the
    /// `FEATUREFLAGS_BASE_URL` environment variable, then [`DEFAULT_BASE_URL`].
    /// Blank values are skipped.
    pub fn resolve_base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }

        match std::env::var(BASE_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn builder(api_key: impl Into<String>) -> ClientOptionsBuilder {
        ClientOptionsBuilder::new(api_key)
    }
}

pub struct ClientOptionsBuilder {
    api_key: String,
    base_url: Option<String>,
    cache_ttl: Duration,
    request_timeout: Duration,
    cleanup_interval: Duration,
}

impl ClientOptionsBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn build(self) -> ClientOptions {
        ClientOptions {
            api_key: self.api_key,
            base_url: self.base_url,
            cache_ttl: self.cache_ttl,
            request_timeout: self.request_timeout,
            cleanup_interval: self.cleanup_interval,
        }
    }

    /// Build the options and construct a client from them.
    pub fn build_client(self) -> Result<crate::FeatureFlagClient> {
        crate::FeatureFlagClient::new(self.build())
    }
}
