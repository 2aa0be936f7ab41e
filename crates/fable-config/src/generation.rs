use std::time::Duration;

use serde::Deserialize;

/// Generation pipeline settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Hard per-attempt timeout for provider generation calls
    /// (in seconds, default 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Per-provider timeout for health-check probes (in seconds, default 5)
    #[serde(default = "default_health_timeout")]
    pub health_check_timeout_secs: u64,
    /// Default sampling temperature when a request does not set one
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Default maximum output tokens when a request does not set one
    #[serde(default = "default_max_output_tokens")]
    pub default_max_output_tokens: u32,
}

impl GenerationConfig {
    /// Generation timeout as a Duration
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Health-check timeout as a Duration
    pub const fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            health_check_timeout_secs: default_health_timeout(),
            default_temperature: default_temperature(),
            default_max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout() -> u64 {
    60
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_timeout() -> u64 {
    5
}

#[allow(clippy::missing_const_for_fn)]
fn default_temperature() -> f64 {
    0.9
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_output_tokens() -> u32 {
    2048
}
