//! Safety threshold derivation and rating scoring
//!
//! Requests carry per-category blocking thresholds derived from the
//! requested safety level; responses carry per-category probability ratings
//! that are folded into a single [0, 1] score.

use std::collections::BTreeMap;

use fable_core::{SafetyLevel, SafetyScores};

use crate::protocol::gemini::{
    GeminiSafetyRating, GeminiSafetySetting, HarmBlockThreshold, HarmCategory,
};

/// Categories scoring below this are recorded as content flags
pub const FLAG_THRESHOLD: f64 = 0.7;

/// Per-category thresholds for a requested safety level
///
/// Sexually explicit content is always pinned to the strictest threshold
/// regardless of the requested level; the other categories follow it.
pub fn safety_settings(level: SafetyLevel) -> Vec<GeminiSafetySetting> {
    let general = match level {
        SafetyLevel::Strict => HarmBlockThreshold::BlockLowAndAbove,
        SafetyLevel::Moderate => HarmBlockThreshold::BlockMediumAndAbove,
        SafetyLevel::Permissive => HarmBlockThreshold::BlockOnlyHigh,
    };

    vec![
        GeminiSafetySetting {
            category: HarmCategory::Harassment,
            threshold: general,
        },
        GeminiSafetySetting {
            category: HarmCategory::HateSpeech,
            threshold: general,
        },
        GeminiSafetySetting {
            category: HarmCategory::SexuallyExplicit,
            threshold: HarmBlockThreshold::BlockLowAndAbove,
        },
        GeminiSafetySetting {
            category: HarmCategory::DangerousContent,
            threshold: general,
        },
    ]
}

/// Score one probability label
///
/// Unknown labels score 1.0, the same default as an absent rating.
fn probability_score(probability: &str) -> f64 {
    match probability {
        "NEGLIGIBLE" => 1.0,
        "LOW" => 0.8,
        "MEDIUM" => 0.5,
        "HIGH" => 0.2,
        _ => 1.0,
    }
}

/// Fold category ratings into safety scores
///
/// The overall score is the minimum category score (1.0 when nothing was
/// rated); categories under [`FLAG_THRESHOLD`] land in the flags list.
pub fn score_ratings(ratings: &[GeminiSafetyRating]) -> SafetyScores {
    if ratings.is_empty() {
        return SafetyScores::unrated();
    }

    let mut categories = BTreeMap::new();
    let mut flags = Vec::new();
    let mut overall = 1.0f64;

    for rating in ratings {
        let score = probability_score(&rating.probability);
        categories.insert(rating.category.clone(), score);
        if score < FLAG_THRESHOLD {
            flags.push(rating.category.clone());
        }
        overall = overall.min(score);
    }

    flags.sort();
    flags.dedup();

    SafetyScores {
        overall,
        categories,
        flags,
    }
}
