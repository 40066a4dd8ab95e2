use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

use crate::client::SDK_VERSION;
use crate::error::{sanitize_message, ErrorCode, FeatureFlagError, Result};
use crate::types::{BulkEvaluationResult, EvaluationResult};

const API_KEY_HEADER: &str = "X-API-Key";

fn user_agent() -> String {
    format!("featureflags-rust/{}", SDK_VERSION)
}

/// Optional JSON body the evaluation endpoint sends with error statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Transport for the remote evaluation endpoint.
///
/// Every call attaches the API key, is bounded by the request timeout, and
/// maps failures onto [`ErrorCode`]s. Nothing is cached here.
pub struct HttpClient {
    client: Client,
    base_url: Url,
    api_key: String,
    request_timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| {
            FeatureFlagError::with_source(
                ErrorCode::InvalidBaseUrl,
                format!("Invalid base URL: {}", trimmed),
                e,
            )
        })?;

        if base_url.cannot_be_a_base() {
            return Err(FeatureFlagError::config_error(
                ErrorCode::InvalidBaseUrl,
                format!("Invalid base URL: {}", trimmed),
            ));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| {
                FeatureFlagError::with_source(ErrorCode::NetworkError, "Failed to create HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// `GET {base}/evaluate/{flag_key}[?user={user_id}]`
    pub async fn evaluate_flag(&self, flag_key: &str, user_id: Option<&str>) -> Result<EvaluationResult> {
        let url = self.endpoint(&["evaluate", flag_key], user_id);
        self.request(url).await
    }

    /// `GET {base}/evaluate[?user={user_id}]`
    pub async fn evaluate_all_flags(&self, user_id: Option<&str>) -> Result<BulkEvaluationResult> {
        let url = self.endpoint(&["evaluate"], user_id);
        self.request(url).await
    }

    fn endpoint(&self, segments: &[&str], user_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();

        // Always Ok: cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        if let Some(user) = user_id.filter(|u| !u.is_empty()) {
            url.query_pairs_mut().append_pair("user", user);
        }

        url
    }

    async fn request<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::trace!(path = url.path(), "Sending evaluation request");

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.convert_error(e))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.convert_error(e))?;

            serde_json::from_str(&body).map_err(|e| {
                FeatureFlagError::with_source(
                    ErrorCode::UnknownError,
                    format!("Failed to parse response: {}", e),
                    e,
                )
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_to_error(status, &body))
        }
    }

    fn convert_error(&self, error: reqwest::Error) -> FeatureFlagError {
        if error.is_timeout() {
            FeatureFlagError::with_source(
                ErrorCode::Timeout,
                format!("Request timed out after {}ms", self.request_timeout.as_millis()),
                error,
            )
        } else {
            let message = sanitize_message(&format!("Network error: {}", error));
            FeatureFlagError::with_source(ErrorCode::NetworkError, message, error)
        }
    }
}

fn status_to_error(status: StatusCode, body: &str) -> FeatureFlagError {
    let message = error_message(status, body);

    match status {
        StatusCode::UNAUTHORIZED => FeatureFlagError::authentication(message),
        StatusCode::NOT_FOUND => FeatureFlagError::flag_not_found(message),
        _ => FeatureFlagError::new_sanitized(
            ErrorCode::InternalError,
            format!("API error ({}): {}", status.as_u16(), message),
        ),
    }
}

/// `message`, then `error` from a JSON body, else the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_string())
}
