//! Provider abstraction for the Fable story engine
//!
//! Defines the capability contract every generation provider implements
//! (story generation, batch image analysis, health probes, usage stats) and
//! ships the Google Generative Language implementation, including prompt
//! construction, safety threshold mapping, HTTP failure classification, and
//! the cost/quality scoring applied to generated text.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod prompt;
pub mod protocol;
pub mod provider;
pub mod safety;
pub mod scoring;
pub mod stats;

pub use error::ProviderError;
pub use provider::Provider;
pub use provider::gemini::GeminiProvider;
pub use stats::{ProviderHealth, UsageStats};
