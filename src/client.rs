use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{build_cache_key, ClientOptions, ClientOptionsBuilder, LocalCache};
use crate::error::{mask_api_key, FeatureFlagError, Result};
use crate::http::HttpClient;
use crate::types::{EvaluationResult, FlagValueType};

pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lifecycle of a [`FeatureFlagClient`]. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Active,
    Closed,
}

/// Evaluates feature flags with a local TTL cache in front of the remote
/// evaluation endpoint.
///
/// Getters never fail because the backend is unavailable: not-found flags,
/// timeouts, network and server errors all resolve to the caller's default.
/// The one error that is returned is an authentication failure
/// ([`ErrorCode::Unauthorized`](crate::ErrorCode::Unauthorized)).
///
/// ```no_run
/// # async fn run() -> featureflags::Result<()> {
/// use featureflags::{ClientOptions, FeatureFlagClient};
///
/// let client = FeatureFlagClient::new(ClientOptions::new("ff_production_abc123"))?;
///
/// let enabled = client.get_boolean_flag("dark-mode", Some("user-42"), false).await?;
/// println!("Dark mode: {}", enabled);
///
/// client.close();
/// # Ok(())
/// # }
/// ```
pub struct FeatureFlagClient {
    http_client: HttpClient,
    cache: LocalCache<EvaluationResult>,
    closed: AtomicBool,
}

impl FeatureFlagClient {
    /// Validates `options` and creates an active client.
    ///
    /// Must be called within a tokio runtime for the cache sweep to run.
    pub fn new(options: ClientOptions) -> Result<Self> {
        options.validate()?;

        let base_url = options.resolve_base_url();
        let http_client = HttpClient::new(&base_url, options.api_key.clone(), options.request_timeout)?;
        let cache = LocalCache::with_cleanup_interval(options.cache_ttl, options.cleanup_interval);

        tracing::info!(
            base_url = %http_client.base_url(),
            api_key = %mask_api_key(&options.api_key),
            "Feature flag client initialized"
        );

        Ok(Self {
            http_client,
            cache,
            closed: AtomicBool::new(false),
        })
    }

    pub fn builder(api_key: impl Into<String>) -> ClientOptionsBuilder {
        ClientOptions::builder(api_key)
    }

    pub async fn get_boolean_flag(
        &self,
        flag_key: &str,
        user_id: Option<&str>,
        default_value: bool,
    ) -> Result<bool> {
        self.get_flag(flag_key, user_id, default_value).await
    }

    pub async fn get_string_flag(
        &self,
        flag_key: &str,
        user_id: Option<&str>,
        default_value: &str,
    ) -> Result<String> {
        self.get_flag(flag_key, user_id, default_value.to_string()).await
    }

    pub async fn get_number_flag(
        &self,
        flag_key: &str,
        user_id: Option<&str>,
        default_value: f64,
    ) -> Result<f64> {
        self.get_flag(flag_key, user_id, default_value).await
    }

    /// Integer view of a NUMBER flag; fractional values are truncated.
    pub async fn get_int_flag(
        &self,
        flag_key: &str,
        user_id: Option<&str>,
        default_value: i64,
    ) -> Result<i64> {
        self.get_flag(flag_key, user_id, default_value).await
    }

    /// Evaluate a flag as `T`, returning `default_value` when the flag is
    /// unavailable or its declared type is not `T`'s.
    pub async fn get_flag<T: FlagValueType>(
        &self,
        flag_key: &str,
        user_id: Option<&str>,
        default_value: T,
    ) -> Result<T> {
        let result = match self.evaluate(flag_key, user_id).await? {
            Some(result) => result,
            None => return Ok(default_value),
        };

        match result.typed_value::<T>() {
            Some(value) => Ok(value),
            None => {
                tracing::warn!(
                    flag_key,
                    expected = %T::FLAG_TYPE,
                    actual = %result.flag_type,
                    "Flag type mismatch, returning default"
                );
                Ok(default_value)
            }
        }
    }

    /// Evaluate every flag for `user_id` in one request.
    ///
    /// Each result is cached under its own key, so single-flag getters for the
    /// same user are served locally afterwards. Any failure other than an
    /// authentication error yields an empty map.
    pub async fn get_all_flags(&self, user_id: Option<&str>) -> Result<HashMap<String, EvaluationResult>> {
        if self.is_closed() {
            tracing::debug!("Client closed, skipping bulk evaluation");
            return Ok(HashMap::new());
        }

        match self.http_client.evaluate_all_flags(user_id).await {
            Ok(bulk) => {
                // close() may have run while the request was in flight
                if !self.is_closed() {
                    for (flag_key, result) in &bulk.flags {
                        self.cache.set(build_cache_key(flag_key, user_id), result.clone());
                    }
                    tracing::debug!(count = bulk.flags.len(), "Cached bulk evaluation");
                }
                Ok(bulk.flags)
            }
            Err(e) => {
                absorb(e, "*")?;
                Ok(HashMap::new())
            }
        }
    }

    /// Drop the cached evaluation of one (flag, user) pair.
    pub fn invalidate_cache(&self, flag_key: &str, user_id: Option<&str>) {
        self.cache.delete(&build_cache_key(flag_key, user_id));
        tracing::debug!(flag_key, "Invalidated cached flag");
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Cleared all cached flags");
    }

    /// Stop the cache sweep and release cached state.
    ///
    /// Afterwards getters return their defaults without touching the network.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cache.shutdown();
        tracing::info!("Feature flag client closed");
    }

    pub fn state(&self) -> ClientState {
        if self.is_closed() {
            ClientState::Closed
        } else {
            ClientState::Active
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of cached evaluations, including expired ones not yet swept.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Cache-first lookup. `Ok(None)` means "use the default".
    async fn evaluate(&self, flag_key: &str, user_id: Option<&str>) -> Result<Option<EvaluationResult>> {
        if self.is_closed() {
            tracing::debug!(flag_key, "Client closed, returning default");
            return Ok(None);
        }

        let cache_key = build_cache_key(flag_key, user_id);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::trace!(flag_key, "Cache hit");
            return Ok(Some(cached));
        }

        tracing::trace!(flag_key, "Cache miss");

        match self.http_client.evaluate_flag(flag_key, user_id).await {
            Ok(result) => {
                if !self.is_closed() {
                    self.cache.set(cache_key, result.clone());
                }
                Ok(Some(result))
            }
            Err(e) => {
                absorb(e, flag_key)?;
                Ok(None)
            }
        }
    }
}

/// Pass authentication errors through and swallow everything else.
fn absorb(error: FeatureFlagError, flag_key: &str) -> Result<()> {
    if error.is_authentication_error() {
        return Err(error);
    }

    if error.is_not_found() {
        tracing::debug!(flag_key, "Flag not found, returning default");
    } else {
        tracing::warn!(
            flag_key,
            code = %error.code,
            error = %error.message,
            "Flag evaluation failed, returning default"
        );
    }

    Ok(())
}

/// A client shared between tasks.
pub type SharedClient = Arc<FeatureFlagClient>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn options(api_key: &str) -> ClientOptions {
        ClientOptions::builder(api_key)
            .base_url("http://localhost:8081")
            .build()
    }

    #[test]
    fn test_new_rejects_invalid_api_key() {
        let err = FeatureFlagClient::new(options("sdk_wrong_prefix")).err().unwrap();
        assert_eq!(err.code, ErrorCode::InvalidApiKey);

        let err = FeatureFlagClient::new(options("")).err().unwrap();
        assert_eq!(err.code, ErrorCode::InvalidApiKey);
    }

    #[tokio::test]
    async fn test_close_transitions_to_closed() {
        let client = FeatureFlagClient::new(options("ff_test_key")).unwrap();
        assert_eq!(client.state(), ClientState::Active);

        client.close();
        client.close();

        assert_eq!(client.state(), ClientState::Closed);
    }

    #[tokio::test]
    async fn test_closed_client_returns_defaults_without_network() {
        // Nothing listens on this port; a request would surface as a network error log
        let client = FeatureFlagClient::new(options("ff_test_key")).unwrap();
        client.close();

        assert!(client.get_boolean_flag("flag", None, true).await.unwrap());
        assert_eq!(client.get_string_flag("flag", None, "x").await.unwrap(), "x");
        assert!(client.get_all_flags(None).await.unwrap().is_empty());
        assert_eq!(client.cached_len(), 0);
    }

    #[test]
    fn test_absorb_only_passes_authentication_errors() {
        assert!(absorb(FeatureFlagError::authentication("bad key"), "f").is_err());
        assert!(absorb(FeatureFlagError::flag_not_found("missing"), "f").is_ok());
        assert!(absorb(FeatureFlagError::new(ErrorCode::Timeout, "slow"), "f").is_ok());
    }
}
