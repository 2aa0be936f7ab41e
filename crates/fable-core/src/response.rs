use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Token usage statistics reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion)
    pub total_tokens: u32,
}

/// Content-safety scores derived from provider category ratings
///
/// `overall` is the minimum category score and always falls in [0, 1].
/// Categories scoring below the flag threshold (0.7) are listed in `flags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyScores {
    /// Minimum score across all rated categories; 1.0 when nothing was rated
    pub overall: f64,
    /// Per-category scores keyed by the provider's category name
    pub categories: BTreeMap<String, f64>,
    /// Categories whose score fell below the flag threshold
    pub flags: Vec<String>,
}

impl SafetyScores {
    /// Scores for a response that carried no safety ratings
    pub fn unrated() -> Self {
        Self {
            overall: 1.0,
            categories: BTreeMap::new(),
            flags: Vec::new(),
        }
    }

    /// Whether any category was flagged
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

impl Default for SafetyScores {
    fn default() -> Self {
        Self::unrated()
    }
}

/// Heuristic quality metrics computed from the story text
///
/// Each score is one of a small set of fixed values so results are
/// reproducible across runs; see the scoring module for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Sentence-length band check: 0.9 in range, 0.7 outside
    pub coherence: f64,
    /// Length-based proxy: 0.8 above 200 words, 0.6 below
    pub creativity: f64,
    /// Banned-word screen: 0.5 on any hit, 0.9 clean
    pub age_appropriateness: f64,
    /// Word-length check against the reader's age band: 0.9 within, 0.6 over
    pub vocabulary_complexity: f64,
}

/// A generated story as returned by a provider, scored and priced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryResponse {
    /// Story title, split from the first line of the model output
    pub title: String,
    /// Full story text without the title line
    pub content: String,
    /// Model that produced the story
    pub model: String,
    /// Token usage reported by the upstream API
    pub usage: TokenUsage,
    /// Safety scores from the response's category ratings
    pub safety: SafetyScores,
    /// Heuristic quality metrics
    pub quality: QualityMetrics,
    /// Estimated cost in USD from the per-provider pricing table
    pub cost: f64,
    /// Number of words in the story text
    pub word_count: usize,
    /// Estimated reading time in seconds at 200 words per minute
    pub reading_time_secs: u32,
    /// Age-appropriate stretch words extracted for the reader-support UI
    pub vocabulary_words: Vec<String>,
}
