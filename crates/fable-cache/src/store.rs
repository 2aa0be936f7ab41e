use std::collections::HashMap;

use async_trait::async_trait;
use fable_core::{ImageAnalysis, ImageId};

/// Persistence collaborator for image analyses
///
/// Writes are idempotent: re-storing the same analysis for a key is safe.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Fetch whichever of the requested analyses are persisted
    async fn cached(&self, ids: &[ImageId]) -> anyhow::Result<HashMap<ImageId, ImageAnalysis>>;

    /// Persist a batch of analyses
    async fn store(&self, analyses: &HashMap<ImageId, ImageAnalysis>) -> anyhow::Result<()>;
}
