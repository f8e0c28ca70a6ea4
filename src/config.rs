//! Configuration Module
//!
//! Handles loading runtime configuration from environment variables.

use std::env;

/// Default number of entries a micro-cache holds.
pub const DEFAULT_CACHE_CAPACITY: usize = 20;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of entries memo caches hold before evicting the oldest
    pub cache_capacity: usize,
    /// Fallback tracing filter when `RUST_LOG` is not set
    pub log_filter: String,
    /// Simulated latency of the demo's asynchronous fetch, in milliseconds
    pub fetch_delay_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MICRO_CACHE_CAPACITY` - Memo cache capacity (default: 20)
    /// - `LOG_FILTER` - Tracing filter (default: "micro_store=info")
    /// - `FETCH_DELAY_MS` - Demo fetch latency (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: env::var("MICRO_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.cache_capacity),
            log_filter: env::var("LOG_FILTER")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            fetch_delay_ms: env::var("FETCH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_delay_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            log_filter: "micro_store=info".to_string(),
            fetch_delay_ms: 50,
        }
    }
}
