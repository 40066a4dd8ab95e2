mod cache;
mod config;

pub use cache::{build_cache_key, LocalCache, DEFAULT_CLEANUP_INTERVAL, NULL_USER_SENTINEL};
pub use config::{
    ClientOptions, ClientOptionsBuilder, API_KEY_PREFIX, BASE_URL_ENV_VAR, DEFAULT_BASE_URL,
    DEFAULT_CACHE_TTL, DEFAULT_REQUEST_TIMEOUT,
};
