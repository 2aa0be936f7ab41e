use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single generation provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider protocol type
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (defaults to the provider's public endpoint)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model served for story generation and image analysis
    #[serde(default = "default_model")]
    pub model: String,
    /// TCP connect timeout in seconds (default 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Pricing table used for cost estimates
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl ProviderConfig {
    /// Connect timeout as a Duration
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Supported provider protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Google Generative Language API
    Gemini,
}

/// Per-1000-token rates in USD for cost estimation
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Rate per 1000 prompt tokens
    #[serde(default = "default_prompt_rate")]
    pub prompt_rate: f64,
    /// Rate per 1000 completion tokens
    #[serde(default = "default_completion_rate")]
    pub completion_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            prompt_rate: default_prompt_rate(),
            completion_rate: default_completion_rate(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_owned()
}

#[allow(clippy::missing_const_for_fn)]
fn default_connect_timeout() -> u64 {
    10
}

#[allow(clippy::missing_const_for_fn)]
fn default_prompt_rate() -> f64 {
    0.00015
}

#[allow(clippy::missing_const_for_fn)]
fn default_completion_rate() -> f64 {
    0.0006
}
