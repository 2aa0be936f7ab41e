//! Shared domain model for the Fable story engine
//!
//! Identifier newtypes, the request/record/artifact types exchanged between
//! the orchestrator and its collaborators, and the text statistics that feed
//! quality scoring. Every other crate in the workspace depends on this one.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod id;
pub mod image;
pub mod record;
pub mod request;
pub mod response;
pub mod text;

pub use id::{ArtifactId, ChildId, FamilyId, GenerationId, ImageId, ParentId};
pub use image::{ImageAnalysis, ImageContent};
pub use record::{GenerationRecord, GenerationStatus, StoryArtifact};
pub use request::{AgeBand, SafetyLevel, StoryRequest};
pub use response::{QualityMetrics, SafetyScores, StoryResponse, TokenUsage};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
