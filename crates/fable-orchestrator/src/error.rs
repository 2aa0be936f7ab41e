use fable_provider::ProviderError;
use thiserror::Error;

/// Provider registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A configured provider could not be constructed
    #[error("provider {name} failed to initialize: {source}")]
    Init {
        /// Configured provider name
        name: String,
        source: ProviderError,
    },

    /// No provider is registered under the requested name
    #[error("provider not found: {name}")]
    NotFound { name: String },
}
