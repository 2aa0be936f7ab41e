//! Google Generative Language API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// `generateContent` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation contents
    pub contents: Vec<GeminiContent>,
    /// System instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    /// Generation configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
    /// Per-category safety thresholds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<GeminiSafetySetting>,
}

/// Content object containing a role and parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role ("user" or "model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    /// User-role content with a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_owned()),
            parts: vec![GeminiPart::Text(text.into())],
        }
    }

    /// Role-less content, used for system instructions
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![GeminiPart::Text(text.into())],
        }
    }

    /// Concatenated text across all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                GeminiPart::Text(text) => Some(text.as_str()),
                GeminiPart::InlineData(_) => None,
            })
            .collect()
    }
}

/// Individual part within a content object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeminiPart {
    /// Text content
    Text(String),
    /// Inline binary data (images)
    InlineData(GeminiInlineData),
}

/// Inline binary data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    /// MIME type (e.g. "image/jpeg")
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// Generation configuration parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// One safety setting: a category and the threshold applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSafetySetting {
    /// Harm category the threshold applies to
    pub category: HarmCategory,
    /// Probability level at and above which content is blocked
    pub threshold: HarmBlockThreshold,
}

/// Harm categories configurable per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment content
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech and content
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

impl HarmCategory {
    /// The wire name for this category
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harassment => "HARM_CATEGORY_HARASSMENT",
            Self::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            Self::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            Self::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// Blocking thresholds, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    /// Block low probability and above
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    BlockLowAndAbove,
    /// Block medium probability and above
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
    /// Block only high probability
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    /// Never block
    #[serde(rename = "BLOCK_NONE")]
    BlockNone,
}

// -- Response types --

/// `generateContent` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates; empty when the prompt was blocked
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Present when the prompt itself was screened
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    /// Token usage metadata
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

/// Generated candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Generated content; absent when the candidate was blocked
    #[serde(default)]
    pub content: Option<GeminiContent>,
    /// Finish reason ("STOP", "MAX_TOKENS", "SAFETY", ...)
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Per-category safety ratings for this candidate
    #[serde(default)]
    pub safety_ratings: Vec<GeminiSafetyRating>,
}

/// Feedback on the prompt after safety screening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    /// Why the prompt was blocked, when it was
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Per-category ratings for the prompt
    #[serde(default)]
    pub safety_ratings: Vec<GeminiSafetyRating>,
}

/// One category's safety rating
///
/// Category and probability stay as strings: responses routinely carry
/// categories newer than the request-side enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiSafetyRating {
    /// Category name (e.g. "HARM_CATEGORY_HARASSMENT")
    pub category: String,
    /// Probability level ("NEGLIGIBLE", "LOW", "MEDIUM", "HIGH")
    pub probability: String,
    /// Whether this rating blocked the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

/// Token usage metadata
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    /// Prompt token count
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Candidates token count
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total token count
    #[serde(default)]
    pub total_token_count: u32,
}

// -- Models list types --

/// Models list response, used by health probes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModelList {
    /// Advertised models
    #[serde(default)]
    pub models: Vec<GeminiModelInfo>,
    /// Pagination token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One advertised model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModelInfo {
    /// Full model name (e.g. "models/gemini-1.5-flash")
    pub name: String,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
}

// -- Error response --

/// Error body shape for non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorResponse {
    /// Error details
    pub error: GeminiErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorDetail {
    /// HTTP status code
    pub code: u32,
    /// Error message
    pub message: String,
    /// Error status string (e.g. "INVALID_ARGUMENT")
    pub status: String,
}
