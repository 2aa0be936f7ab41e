use serde::Deserialize;

/// Content-safety settings applied to generated text
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyConfig {
    /// Words that immediately lower the age-appropriateness score when they
    /// appear anywhere in the story (case-insensitive)
    #[serde(default = "default_banned_words")]
    pub banned_words: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            banned_words: default_banned_words(),
        }
    }
}

fn default_banned_words() -> Vec<String> {
    [
        "kill", "murder", "blood", "gun", "knife", "weapon", "drunk", "cigarette", "drugs",
        "terrify", "corpse", "hatred",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}
