use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ImageId;

/// Reader age bracket driving prompt register and vocabulary expectations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum AgeBand {
    /// Ages 3-5: picture-book register, very short sentences
    #[serde(rename = "3-5")]
    #[strum(serialize = "3-5")]
    Preschool,
    /// Ages 6-8: early readers
    #[serde(rename = "6-8")]
    #[strum(serialize = "6-8")]
    EarlyReader,
    /// Ages 9-12: confident readers, chapter-length stories
    #[serde(rename = "9-12")]
    #[strum(serialize = "9-12")]
    MiddleGrade,
}

impl AgeBand {
    /// Average word length (in letters) readers in this band are expected
    /// to handle comfortably
    pub const fn expected_word_length(self) -> f64 {
        match self {
            Self::Preschool => 5.0,
            Self::EarlyReader => 6.5,
            Self::MiddleGrade => 8.0,
        }
    }
}

/// How aggressively upstream content-safety filtering is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SafetyLevel {
    /// Block everything above negligible probability
    Strict,
    /// Block medium probability and above
    Moderate,
    /// Block only high probability
    Permissive,
}

/// A story generation request, immutable once submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    /// What the story should be about
    pub prompt: String,
    /// Reader age bracket
    pub age_band: AgeBand,
    /// Optional theme (e.g. "bedtime", "adventure")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Educational goals to weave into the story
    #[serde(default)]
    pub educational_goals: Vec<String>,
    /// Content-safety filtering level
    pub safety_level: SafetyLevel,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Descriptions derived from uploaded images, woven into the prompt
    #[serde(default)]
    pub image_descriptions: Vec<String>,
    /// Character packs owned by the family to feature in the story
    #[serde(default)]
    pub character_packs: Vec<String>,
    /// Images the request references (already analyzed or pending)
    #[serde(default)]
    pub image_ids: Vec<ImageId>,
}

impl StoryRequest {
    /// Minimal request with everything optional left empty
    pub fn new(prompt: impl Into<String>, age_band: AgeBand, safety_level: SafetyLevel) -> Self {
        Self {
            prompt: prompt.into(),
            age_band,
            theme: None,
            educational_goals: Vec::new(),
            safety_level,
            temperature: None,
            max_output_tokens: None,
            image_descriptions: Vec::new(),
            character_packs: Vec::new(),
            image_ids: Vec::new(),
        }
    }
}
