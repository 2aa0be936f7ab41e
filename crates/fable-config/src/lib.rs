#![allow(clippy::must_use_candidate)]

//! Process-wide configuration for the Fable story engine
//!
//! Loaded once at startup from TOML with `{{ env.VAR }}` expansion, then
//! treated as immutable: pricing tables, prompt knobs, banned-word lists,
//! quota limits, cache sizing, and provider credentials all live here.

pub mod cache;
mod env;
pub mod generation;
mod loader;
pub mod provider;
pub mod quota;
pub mod safety;

use indexmap::IndexMap;
use serde::Deserialize;

pub use cache::CacheConfig;
pub use generation::GenerationConfig;
pub use provider::{PricingConfig, ProviderConfig, ProviderType};
pub use quota::{MonthlyWindow, QuotaConfig};
pub use safety::SafetyConfig;

/// Top-level Fable configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Provider the default selection policy routes to
    #[serde(default)]
    pub default_provider: String,
    /// Provider configurations keyed by name
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Generation pipeline settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Per-user quota limits and window policy
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Image-analysis cache sizing
    #[serde(default)]
    pub cache: CacheConfig,
    /// Content-safety settings
    #[serde(default)]
    pub safety: SafetyConfig,
}
