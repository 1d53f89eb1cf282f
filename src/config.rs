//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::{
    DEFAULT_KEY_SIZE, DEFAULT_MAX_BYTES, DEFAULT_SHARD_COUNT, DEFAULT_TTL_SECONDS,
    DEFAULT_VALUE_SIZE,
};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Total cache arena ceiling in bytes
    pub max_bytes: usize,
    /// Number of cache shards, must be a power of two
    pub shards: usize,
    /// Global TTL in seconds
    pub ttl_seconds: i64,
    /// Soft key-size cap enforced on requests
    pub max_key_size: usize,
    /// Soft value-size cap enforced on requests
    pub max_value_size: usize,
    /// Whether cache counters are maintained
    pub stats_enabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_BYTES` - Cache arena ceiling in bytes (default: 32 MiB)
    /// - `SHARDS` - Shard count, power of two (default: 512)
    /// - `TTL_SECONDS` - Global TTL in seconds (default: 1800)
    /// - `MAX_KEY_SIZE` - Request key size cap (default: 16 KiB)
    /// - `MAX_VALUE_SIZE` - Request value size cap (default: 48 KiB - 12)
    /// - `STATS_ENABLED` - Maintain counters (default: true)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            max_bytes: env::var("MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BYTES),
            shards: env::var("SHARDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SHARD_COUNT),
            ttl_seconds: env::var("TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECONDS),
            max_key_size: env::var("MAX_KEY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_KEY_SIZE),
            max_value_size: env::var("MAX_VALUE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VALUE_SIZE),
            stats_enabled: env::var("STATS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_bytes: DEFAULT_MAX_BYTES,
            shards: DEFAULT_SHARD_COUNT,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_key_size: DEFAULT_KEY_SIZE,
            max_value_size: DEFAULT_VALUE_SIZE,
            stats_enabled: true,
        }
    }
}
