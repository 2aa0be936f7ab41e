//! Collaborator traits implemented outside the engine

use async_trait::async_trait;
use fable_core::{
    ArtifactId, ChildId, FamilyId, GenerationId, GenerationStatus, ImageContent, ImageId,
    ParentId, StoryRequest, StoryResponse,
};

/// Terminal update applied to a generation record
///
/// Built by the orchestrator once per request, after the outcome is known.
#[derive(Debug, Clone)]
pub struct RecordUpdate {
    /// Terminal status
    pub status: GenerationStatus,
    /// Artifact produced, on success
    pub artifact_id: Option<ArtifactId>,
    /// Failure detail, on failure
    pub error: Option<String>,
    /// Provider that handled the attempt, where one was selected
    pub provider: Option<String>,
    /// Estimated cost in USD, on success
    pub cost: Option<f64>,
}

impl RecordUpdate {
    /// Update for a completed generation
    pub fn completed(artifact_id: ArtifactId, provider: impl Into<String>, cost: f64) -> Self {
        Self {
            status: GenerationStatus::Completed,
            artifact_id: Some(artifact_id),
            error: None,
            provider: Some(provider.into()),
            cost: Some(cost),
        }
    }

    /// Update for a failed or rejected generation
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Failed,
            artifact_id: None,
            error: Some(error.into()),
            provider: None,
            cost: None,
        }
    }

    /// Attach the provider that handled the attempt
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Persistence collaborator for generation records and story artifacts
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Create a pending record for a submitted request
    async fn create_record(
        &self,
        parent: ParentId,
        child: ChildId,
        family: FamilyId,
        request: &StoryRequest,
    ) -> anyhow::Result<GenerationId>;

    /// Apply the terminal update for a record
    ///
    /// Called exactly once per record.
    async fn update_record(&self, id: GenerationId, update: RecordUpdate) -> anyhow::Result<()>;

    /// Persist the artifact for a successful generation
    async fn create_artifact(
        &self,
        generation_id: GenerationId,
        response: &StoryResponse,
        request: &StoryRequest,
    ) -> anyhow::Result<ArtifactId>;
}

/// File-storage collaborator that loads image bytes for analysis
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Load content for the requested images
    ///
    /// An image the source cannot find may be omitted from the result; the
    /// analysis for a missing image then fails rather than hangs.
    async fn load(&self, ids: &[ImageId]) -> anyhow::Result<Vec<ImageContent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_updates_carry_the_outcome() {
        let artifact = ArtifactId::new();
        let update = RecordUpdate::completed(artifact, "gemini", 0.0021);
        assert_eq!(update.status, GenerationStatus::Completed);
        assert_eq!(update.artifact_id, Some(artifact));
        assert_eq!(update.provider.as_deref(), Some("gemini"));
        assert!(update.error.is_none());
    }

    #[test]
    fn failed_updates_can_name_the_provider() {
        let update = RecordUpdate::failed("rate limited").with_provider("gemini");
        assert_eq!(update.status, GenerationStatus::Failed);
        assert_eq!(update.error.as_deref(), Some("rate limited"));
        assert_eq!(update.provider.as_deref(), Some("gemini"));
        assert!(update.cost.is_none());
    }
}
