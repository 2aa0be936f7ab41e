use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        Self::from_toml(&expanded)
    }

    /// Parse and validate configuration from expanded TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, the default provider
    /// is unknown, or any section holds an out-of-range value
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_generation()?;
        self.validate_quota()?;
        self.validate_cache()?;
        self.validate_safety()?;
        Ok(())
    }

    /// Ensure at least one provider exists and the default points at one
    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured");
        }

        if self.default_provider.is_empty() {
            anyhow::bail!("default_provider must be set");
        }

        if !self.providers.contains_key(&self.default_provider) {
            anyhow::bail!(
                "default_provider '{}' is not a configured provider",
                self.default_provider
            );
        }

        for (name, provider) in &self.providers {
            match &provider.api_key {
                None => anyhow::bail!("provider '{name}' is missing an api_key"),
                Some(key) if key.expose_secret().is_empty() => {
                    anyhow::bail!("provider '{name}' has an empty api_key");
                }
                Some(_) => {}
            }

            if provider.model.is_empty() {
                anyhow::bail!("provider '{name}' has an empty model");
            }

            if let Some(ref url) = provider.base_url
                && !matches!(url.scheme(), "http" | "https")
            {
                anyhow::bail!("provider '{name}' base_url must be http or https");
            }

            if provider.connect_timeout_secs == 0 {
                anyhow::bail!("provider '{name}' connect_timeout_secs must be greater than 0");
            }

            let pricing = provider.pricing;
            if !pricing.prompt_rate.is_finite()
                || !pricing.completion_rate.is_finite()
                || pricing.prompt_rate < 0.0
                || pricing.completion_rate < 0.0
            {
                anyhow::bail!("provider '{name}' pricing rates must be finite and non-negative");
            }
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        if self.generation.timeout_secs == 0 {
            anyhow::bail!("generation.timeout_secs must be greater than 0");
        }

        if self.generation.health_check_timeout_secs == 0 {
            anyhow::bail!("generation.health_check_timeout_secs must be greater than 0");
        }

        let temp = self.generation.default_temperature;
        if !(0.0..=2.0).contains(&temp) {
            anyhow::bail!("generation.default_temperature must be between 0.0 and 2.0");
        }

        if self.generation.default_max_output_tokens == 0 {
            anyhow::bail!("generation.default_max_output_tokens must be greater than 0");
        }

        Ok(())
    }

    fn validate_quota(&self) -> anyhow::Result<()> {
        if self.quota.daily_limit == 0 {
            anyhow::bail!("quota.daily_limit must be greater than 0");
        }

        if self.quota.monthly_limit < self.quota.daily_limit {
            anyhow::bail!("quota.monthly_limit must be at least quota.daily_limit");
        }

        Ok(())
    }

    fn validate_cache(&self) -> anyhow::Result<()> {
        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be greater than 0");
        }

        if self.cache.capacity == 0 {
            anyhow::bail!("cache.capacity must be greater than 0");
        }

        if self.cache.capacity > 1_000_000 {
            anyhow::bail!("cache.capacity exceeds maximum of 1,000,000");
        }

        Ok(())
    }

    fn validate_safety(&self) -> anyhow::Result<()> {
        if self.safety.banned_words.iter().any(|w| w.trim().is_empty()) {
            anyhow::bail!("safety.banned_words must not contain empty entries");
        }

        Ok(())
    }
}
