//! Story generation orchestration for the Fable story engine
//!
//! Wires the provider registry, quota guard, image-analysis cache, and
//! health monitor into a single façade. Callers submit a request and get
//! a typed outcome; provider failures, quota rejections, safety blocks,
//! and timeouts never escape as raw errors.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod health;
mod orchestrator;
mod registry;
mod result;
mod store;

pub use error::RegistryError;
pub use health::HealthMonitor;
pub use orchestrator::Orchestrator;
pub use registry::{DefaultProviderPolicy, ProviderRegistry, SelectionPolicy};
pub use result::{ImageAnalysisResult, StoryGenerationResult, UserQuotaInfo};
pub use store::{GenerationStore, ImageSource, RecordUpdate};
