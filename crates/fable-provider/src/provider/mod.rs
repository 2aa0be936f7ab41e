//! Provider trait and implementations for story model backends

pub mod gemini;

use std::collections::HashMap;

use async_trait::async_trait;
use fable_core::{ImageAnalysis, ImageContent, ImageId, StoryRequest, StoryResponse};

use crate::error::ProviderError;
use crate::stats::{ProviderHealth, UsageStats};

/// Trait implemented by each story generation backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Generate a complete story for the request
    async fn generate_story(&self, request: &StoryRequest)
    -> Result<StoryResponse, ProviderError>;

    /// Analyze a batch of images in a single upstream call
    ///
    /// Returns one analysis per input image, keyed by image id.
    async fn analyze_images(
        &self,
        images: &[ImageContent],
    ) -> Result<HashMap<ImageId, ImageAnalysis>, ProviderError>;

    /// Probe upstream reachability
    ///
    /// Never fails; an unreachable provider is reported as unhealthy with
    /// the error captured in the result.
    async fn health_check(&self) -> ProviderHealth;

    /// Lifetime usage counters for this provider instance
    async fn usage_stats(&self) -> UsageStats;
}
