use std::time::Duration;

use serde::Deserialize;

/// Image-analysis cache sizing
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// How long a cached analysis stays valid (in seconds, default 24h)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Maximum entries held in the in-process hot layer
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl CacheConfig {
    /// Entry TTL as a Duration
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            capacity: default_capacity(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_ttl() -> u64 {
    86_400
}

#[allow(clippy::missing_const_for_fn)]
fn default_capacity() -> u64 {
    10_000
}
