//! Typed results returned to callers

use std::collections::HashMap;

use fable_core::{ArtifactId, GenerationId, ImageAnalysis, ImageId, QualityMetrics, SafetyScores};
use fable_quota::{QuotaScope, QuotaSnapshot};
use serde::Serialize;

/// Outcome of a story generation request
///
/// Every submission resolves to exactly one variant; provider and
/// collaborator failures never escape as raw errors.
#[derive(Debug, Clone)]
pub enum StoryGenerationResult {
    /// Story generated, artifact persisted, record completed
    Succeeded {
        generation_id: GenerationId,
        artifact_id: ArtifactId,
        title: String,
        content: String,
        safety: SafetyScores,
        quality: QualityMetrics,
        /// Estimated cost in USD
        cost: f64,
        /// Provider that served the request
        provider: String,
        /// Wall-clock time from submission to completion
        elapsed_ms: u64,
    },
    /// The attempt failed
    Failed {
        /// Record created for this request, when creation itself succeeded
        generation_id: Option<GenerationId>,
        /// Whether resubmitting the same request may succeed
        retryable: bool,
        /// Seconds to wait before retrying, when the upstream provided one
        retry_after: Option<u64>,
        message: String,
    },
    /// The provider's safety system blocked the prompt or every candidate
    SafetyRejected {
        generation_id: GenerationId,
        /// Partial scores kept for audit
        scores: SafetyScores,
    },
    /// The user has no quota left in the window
    QuotaRejected {
        generation_id: GenerationId,
        /// Which window was exhausted
        scope: QuotaScope,
        limit: u32,
        /// Unix second when the window resets
        resets_at: u64,
    },
}

/// Outcome of an image-analysis request
#[derive(Debug, Clone)]
pub enum ImageAnalysisResult {
    /// Every requested image has an analysis
    Succeeded {
        analyses: HashMap<ImageId, ImageAnalysis>,
    },
    /// Analysis failed or returned unusable results
    Failed { message: String },
}

/// Read-only quota position for one user
///
/// A view over the guard's snapshot; serving it never consumes quota.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserQuotaInfo {
    /// Stories generated in the current daily window
    pub daily_used: u32,
    /// Daily limit
    pub daily_limit: u32,
    /// Stories left today
    pub daily_remaining: u32,
    /// Unix second when the daily window resets
    pub daily_resets_at: u64,
    /// Stories generated in the current monthly window
    pub monthly_used: u32,
    /// Monthly limit
    pub monthly_limit: u32,
    /// Stories left this month
    pub monthly_remaining: u32,
    /// Unix second when the monthly window resets
    pub monthly_resets_at: u64,
}

impl From<QuotaSnapshot> for UserQuotaInfo {
    fn from(snapshot: QuotaSnapshot) -> Self {
        Self {
            daily_used: snapshot.daily_used,
            daily_limit: snapshot.daily_limit,
            daily_remaining: snapshot.daily_remaining,
            daily_resets_at: snapshot.daily_resets_at,
            monthly_used: snapshot.monthly_used,
            monthly_limit: snapshot.monthly_limit,
            monthly_remaining: snapshot.monthly_remaining,
            monthly_resets_at: snapshot.monthly_resets_at,
        }
    }
}
