//! Programmatic configuration builder for integration tests

use fable_config::{Config, PricingConfig, ProviderConfig, ProviderType};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                default_provider: "gemini".to_owned(),
                ..Config::default()
            },
        }
    }

    /// Add a Gemini provider pointed at a mock backend
    pub fn with_gemini_provider(mut self, name: &str, base_url: &str) -> Self {
        self.config.providers.insert(
            name.to_owned(),
            ProviderConfig {
                provider_type: ProviderType::Gemini,
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.parse().expect("valid URL")),
                model: "gemini-1.5-flash".to_owned(),
                connect_timeout_secs: 5,
                pricing: PricingConfig::default(),
            },
        );
        self
    }

    /// Route the default selection policy to the named provider
    pub fn with_default_provider(mut self, name: &str) -> Self {
        self.config.default_provider = name.to_owned();
        self
    }

    /// Set the daily generation limit
    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.config.quota.daily_limit = limit;
        self
    }

    /// Set the monthly generation limit
    pub fn with_monthly_limit(mut self, limit: u32) -> Self {
        self.config.quota.monthly_limit = limit;
        self
    }

    /// Set the per-attempt generation timeout in seconds
    pub fn with_generation_timeout(mut self, secs: u64) -> Self {
        self.config.generation.timeout_secs = secs;
        self
    }

    /// Set the per-provider health probe timeout in seconds
    pub fn with_health_timeout(mut self, secs: u64) -> Self {
        self.config.generation.health_check_timeout_secs = secs;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
