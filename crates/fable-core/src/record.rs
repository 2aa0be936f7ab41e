use serde::{Deserialize, Serialize};

use crate::{
    ArtifactId, ChildId, FamilyId, GenerationId, ParentId, QualityMetrics, SafetyScores,
    StoryRequest,
};

/// Lifecycle status of a generation record
///
/// `Pending` is the only non-terminal status; a record transitions to a
/// terminal status exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Submitted, outcome not yet known
    Pending,
    /// Story generated and artifact persisted
    Completed,
    /// Rejected, failed, or blocked; `error` on the record says why
    Failed,
}

impl GenerationStatus {
    /// Whether this status ends the record's lifecycle
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Persistent record of one generation attempt
///
/// Created at submission and updated exactly once with a terminal status.
/// Deletion is a collaborator concern; this core never removes records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Record identity
    pub id: GenerationId,
    /// Parent who submitted the request
    pub parent_id: ParentId,
    /// Child the story is for
    pub child_id: ChildId,
    /// Owning family
    pub family_id: FamilyId,
    /// Lifecycle status
    pub status: GenerationStatus,
    /// Provider that served (or was selected for) the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Estimated cost in USD, set on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Artifact produced on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<ArtifactId>,
    /// Failure detail for terminal `Failed` records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix seconds at submission
    pub created_at: u64,
    /// Unix seconds at the terminal transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

/// A generated story persisted on success, immutable thereafter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryArtifact {
    /// Artifact identity
    pub id: ArtifactId,
    /// Record this artifact belongs to
    pub generation_id: GenerationId,
    /// Story title
    pub title: String,
    /// Full story text
    pub content: String,
    /// Safety scores computed from provider ratings
    pub safety: SafetyScores,
    /// Heuristic quality metrics
    pub quality: QualityMetrics,
    /// The request that produced this story
    pub request: StoryRequest,
    /// Unix seconds at creation
    pub created_at: u64,
}
