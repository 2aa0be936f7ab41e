//! Name-keyed provider registry and the pluggable selection policy

use std::collections::HashMap;
use std::sync::Arc;

use fable_config::{Config, ProviderType};
use fable_provider::{GeminiProvider, Provider};

use crate::error::RegistryError;

/// Immutable name → provider map assembled at startup
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Registry over pre-built providers
    ///
    /// `from_config` is the normal entry point; this constructor serves
    /// embedders and tests that assemble providers directly.
    pub fn new(
        providers: HashMap<String, Arc<dyn Provider>>,
        default_provider: impl Into<String>,
    ) -> Self {
        Self {
            providers,
            default_provider: default_provider.into(),
        }
    }

    /// Construct every configured provider
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();

        for (name, provider_config) in &config.providers {
            let provider: Arc<dyn Provider> = match provider_config.provider_type {
                ProviderType::Gemini => Arc::new(
                    GeminiProvider::new(
                        name.clone(),
                        provider_config,
                        &config.generation,
                        &config.safety,
                    )
                    .map_err(|source| RegistryError::Init {
                        name: name.clone(),
                        source,
                    })?,
                ),
            };
            providers.insert(name.clone(), provider);
        }

        tracing::debug!(
            providers = providers.len(),
            default = %config.default_provider,
            "provider registry built"
        );
        Ok(Self::new(providers, config.default_provider.clone()))
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Name of the provider the default policy routes to
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// All registered providers keyed by name
    pub const fn providers(&self) -> &HashMap<String, Arc<dyn Provider>> {
        &self.providers
    }
}

/// Chooses which provider serves the next request
///
/// Selection is synchronous and deterministic for a given registry state.
/// The shipped policy always returns the configured default; cost-aware or
/// load-aware policies can slot in behind the same trait.
pub trait SelectionPolicy: Send + Sync {
    /// Pick a provider from the registry
    fn select(&self, registry: &ProviderRegistry) -> Result<Arc<dyn Provider>, RegistryError>;
}

/// Routes every request to the configured default provider
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProviderPolicy;

impl SelectionPolicy for DefaultProviderPolicy {
    fn select(&self, registry: &ProviderRegistry) -> Result<Arc<dyn Provider>, RegistryError> {
        registry
            .get(registry.default_provider())
            .ok_or_else(|| RegistryError::NotFound {
                name: registry.default_provider().to_owned(),
            })
    }
}
