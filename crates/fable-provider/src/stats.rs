//! Provider health snapshots and usage counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use fable_core::{TokenUsage, now_secs};

/// Snapshot of one provider's availability
///
/// Recomputed in full on every health check; a snapshot is never partially
/// updated.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    /// Whether the probe succeeded
    pub healthy: bool,
    /// Probe round-trip time in milliseconds
    pub response_time_ms: u64,
    /// Unix seconds when the probe ran
    pub checked_at: u64,
    /// Failure detail for unhealthy snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Models the provider advertises, when the probe could list them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_models: Option<Vec<String>>,
}

impl ProviderHealth {
    /// Healthy snapshot
    pub fn up(response_time_ms: u64, available_models: Option<Vec<String>>) -> Self {
        Self {
            healthy: true,
            response_time_ms,
            checked_at: now_secs(),
            error: None,
            available_models,
        }
    }

    /// Unhealthy snapshot with the failure captured in `error`
    pub fn down(response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            response_time_ms,
            checked_at: now_secs(),
            error: Some(error.into()),
            available_models: None,
        }
    }
}

/// Lifetime counters for one provider instance
///
/// The upstream API has no telemetry endpoint, so stats are tracked locally
/// and start at zero for a fresh provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    /// Requests attempted (successes and failures)
    pub requests: u64,
    /// Prompt tokens across successful requests
    pub prompt_tokens: u64,
    /// Completion tokens across successful requests
    pub completion_tokens: u64,
    /// Requests that ended in a provider error
    pub failures: u64,
}

/// Atomic counters behind `usage_stats`
#[derive(Debug, Default)]
pub struct UsageRecorder {
    requests: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    failures: AtomicU64,
}

impl UsageRecorder {
    /// Count a request that produced a usable response
    pub fn record_success(&self, usage: TokenUsage) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.prompt_tokens
            .fetch_add(u64::from(usage.prompt_tokens), Ordering::Relaxed);
        self.completion_tokens
            .fetch_add(u64::from(usage.completion_tokens), Ordering::Relaxed);
    }

    /// Count a request that failed
    pub fn record_failure(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> UsageStats {
        UsageStats {
            requests: self.requests.load(Ordering::Relaxed),
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
