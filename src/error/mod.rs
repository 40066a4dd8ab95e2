use thiserror::Error;

pub mod sanitizer;

pub use sanitizer::{mask_api_key, sanitize_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration errors
    InvalidApiKey,
    InvalidBaseUrl,
    InvalidConfig,

    // Evaluation endpoint errors
    Unauthorized,
    NotFound,
    InternalError,

    // Transport errors
    Timeout,
    NetworkError,

    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidApiKey => "invalid_api_key",
            ErrorCode::InvalidBaseUrl => "invalid_base_url",
            ErrorCode::InvalidConfig => "invalid_config",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::NotFound => "not_found",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NetworkError => "network_error",
            ErrorCode::UnknownError => "unknown_error",
        }
    }

    /// Whether a later attempt may succeed without any change on the caller's side.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::Timeout | ErrorCode::NetworkError | ErrorCode::InternalError
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by the SDK.
///
/// The `code` carries the classification. Of all the codes produced while
/// evaluating flags, only [`ErrorCode::Unauthorized`] is ever returned from
/// the [`FeatureFlagClient`](crate::FeatureFlagClient) getters.
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct FeatureFlagError {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeatureFlagError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error whose message is scrubbed of credentials first.
    pub fn new_sanitized(code: ErrorCode, message: impl AsRef<str>) -> Self {
        Self::new(code, sanitize_message(message.as_ref()))
    }

    pub fn config_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    pub fn authentication(message: impl AsRef<str>) -> Self {
        Self::new_sanitized(ErrorCode::Unauthorized, message)
    }

    pub fn flag_not_found(message: impl AsRef<str>) -> Self {
        Self::new_sanitized(ErrorCode::NotFound, message)
    }

    pub fn is_authentication_error(&self) -> bool {
        self.code == ErrorCode::Unauthorized
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_recoverable(&self) -> bool {
        self.code.is_recoverable()
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidApiKey | ErrorCode::InvalidBaseUrl | ErrorCode::InvalidConfig
        )
    }
}

pub type Result<T> = std::result::Result<T, FeatureFlagError>;
