use fable_core::SafetyScores;
use thiserror::Error;

/// Provider failure taxonomy
///
/// Every upstream outcome a provider can fail with; the orchestrator maps
/// these onto terminal request results.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream rate limit (HTTP 429)
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited {
        /// Seconds the caller should wait before retrying
        retry_after: u64,
    },
    /// Caller-caused bad request (HTTP 400)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Upstream failure for this attempt (unexpected status or body)
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// Network or transport failure reaching the provider
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The upstream safety system blocked the prompt or every candidate
    #[error("content blocked by the provider safety system")]
    SafetyBlocked {
        /// Scores computed from whatever ratings the upstream returned
        scores: SafetyScores,
    },
}

impl ProviderError {
    /// Whether the same request may succeed if retried later
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Unavailable(_))
    }

    /// Retry-after hint in seconds, when one applies
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
