//! Feature Flags Rust SDK
//!
//! Client for evaluating feature flags against the evaluation API, with a
//! local TTL cache in front of every lookup.
//!
//! # Quick Start
//!
//! ```no_run
//! use featureflags::FeatureFlagClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> featureflags::Result<()> {
//!     let client = FeatureFlagClient::builder("ff_production_abc123")
//!         .cache_ttl(Duration::from_secs(60))
//!         .build_client()?;
//!
//!     // Served from cache for the next 60 seconds
//!     let dark_mode = client.get_boolean_flag("dark-mode", Some("user-42"), false).await?;
//!     let theme = client.get_string_flag("theme", Some("user-42"), "light").await?;
//!
//!     // Warm the cache for a user in one request
//!     let all = client.get_all_flags(Some("user-42")).await?;
//!     println!("{} flags, dark mode {}, theme {}", all.len(), dark_mode, theme);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Evaluation calls only return `Err` for authentication failures. Every
//! other problem (unknown flag, timeout, unreachable or failing backend)
//! resolves to the default the caller passed in.

pub mod core;
pub mod error;
pub mod http;
pub mod types;
mod client;

pub use types::{BulkEvaluationResult, EvaluationResult, FlagType, FlagValue, FlagValueType};

pub use error::{ErrorCode, FeatureFlagError, Result};

pub use core::{
    build_cache_key, ClientOptions, ClientOptionsBuilder, LocalCache, DEFAULT_BASE_URL,
    DEFAULT_CACHE_TTL, DEFAULT_CLEANUP_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};

pub use http::HttpClient;

pub use client::{ClientState, FeatureFlagClient, SharedClient, SDK_VERSION};
