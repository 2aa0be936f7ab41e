//! Cost estimation and quality heuristics
//!
//! Quality scores are drawn from small fixed sets so the same story text
//! always scores the same way; nothing here calls back to the model.

use fable_config::PricingConfig;
use fable_core::{AgeBand, QualityMetrics, TokenUsage, text};

/// Estimated cost in USD for a priced token usage
///
/// Rates are per 1000 tokens, prompt and completion priced separately.
pub fn estimate_cost(usage: TokenUsage, pricing: &PricingConfig) -> f64 {
    f64::from(usage.prompt_tokens) / 1000.0 * pricing.prompt_rate
        + f64::from(usage.completion_tokens) / 1000.0 * pricing.completion_rate
}

/// Score the story text against the reader's age band
pub fn quality_metrics(content: &str, band: AgeBand, banned_words: &[String]) -> QualityMetrics {
    let words_per_sentence = text::avg_words_per_sentence(content);
    let coherence = if (8.0..=15.0).contains(&words_per_sentence) {
        0.9
    } else {
        0.7
    };

    let creativity = if text::word_count(content) > 200 {
        0.8
    } else {
        0.6
    };

    let lowered = content.to_lowercase();
    let age_appropriateness = if banned_words
        .iter()
        .any(|word| lowered.contains(&word.to_lowercase()))
    {
        0.5
    } else {
        0.9
    };

    let vocabulary_complexity = if text::avg_word_length(content) < band.expected_word_length() {
        0.9
    } else {
        0.6
    };

    QualityMetrics {
        coherence,
        creativity,
        age_appropriateness,
        vocabulary_complexity,
    }
}
