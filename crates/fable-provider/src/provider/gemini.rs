//! Google Generative Language API provider implementation

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use fable_config::{GenerationConfig, PricingConfig, ProviderConfig, SafetyConfig};
use fable_core::{
    ImageAnalysis, ImageContent, ImageId, SafetyLevel, SafetyScores, StoryRequest, StoryResponse,
    TokenUsage, text,
};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::Provider;
use crate::error::ProviderError;
use crate::prompt;
use crate::protocol::gemini::{
    GeminiContent, GeminiErrorResponse, GeminiGenerationConfig, GeminiInlineData, GeminiModelList,
    GeminiPart, GeminiRequest, GeminiResponse, GeminiUsageMetadata,
};
use crate::safety;
use crate::scoring;
use crate::stats::{ProviderHealth, UsageRecorder, UsageStats};

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Retry delay applied when a 429 carries no parseable retry-after header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Google Generative Language API provider
pub struct GeminiProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    model: String,
    pricing: PricingConfig,
    banned_words: Vec<String>,
    default_temperature: f64,
    default_max_output_tokens: u32,
    usage: UsageRecorder,
}

impl GeminiProvider {
    /// Create from provider configuration
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the HTTP client cannot be
    /// built.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(
        name: String,
        config: &ProviderConfig,
        generation: &GenerationConfig,
        safety: &SafetyConfig,
    ) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name,
            client,
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            pricing: config.pricing,
            banned_words: safety.banned_words.clone(),
            default_temperature: generation.default_temperature,
            default_max_output_tokens: generation.default_max_output_tokens,
            usage: UsageRecorder::default(),
        })
    }

    /// Build the `generateContent` endpoint URL
    fn generate_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = format!("{base}/models/{}:generateContent", self.model);
        if let Some(key) = &self.api_key {
            use std::fmt::Write;
            let _ = write!(url, "?key={}", key.expose_secret());
        }
        url
    }

    /// Build the models listing URL used by health probes
    fn models_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = format!("{base}/models");
        if let Some(key) = &self.api_key {
            use std::fmt::Write;
            let _ = write!(url, "?key={}", key.expose_secret());
        }
        url
    }

    fn build_story_request(&self, request: &StoryRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::user_text(prompt::story_prompt(request))],
            system_instruction: Some(GeminiContent::system(prompt::STORY_SYSTEM_INSTRUCTION)),
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(request.temperature.unwrap_or(self.default_temperature)),
                top_p: None,
                top_k: None,
                max_output_tokens: Some(
                    request
                        .max_output_tokens
                        .unwrap_or(self.default_max_output_tokens),
                ),
            }),
            safety_settings: safety::safety_settings(request.safety_level),
        }
    }

    fn build_analysis_request(&self, images: &[ImageContent]) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text(prompt::analysis_prompt(images.len()))];
        for image in images {
            parts.push(GeminiPart::InlineData(GeminiInlineData {
                mime_type: image.mime_type.clone(),
                data: base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    &image.data,
                ),
            }));
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            system_instruction: None,
            generation_config: Some(GeminiGenerationConfig {
                // Low temperature keeps the JSON answer shape stable
                temperature: Some(0.2),
                top_p: None,
                top_k: None,
                max_output_tokens: Some(self.default_max_output_tokens),
            }),
            safety_settings: safety::safety_settings(SafetyLevel::Strict),
        }
    }

    /// Send a `generateContent` request and classify the outcome
    async fn send_generate(&self, wire: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self
            .client
            .post(self.generate_url())
            .json(wire)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::error!(provider = %self.name, error = %e, "upstream request failed");
                ProviderError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_secs(&response).unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            tracing::warn!(provider = %self.name, retry_after, "upstream rate limited");
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(&body);
            tracing::warn!(provider = %self.name, status = %status, "upstream returned error");
            if status == StatusCode::BAD_REQUEST {
                return Err(ProviderError::InvalidRequest(message));
            }
            return Err(ProviderError::GenerationFailed(format!(
                "provider returned {status}: {message}"
            )));
        }

        response.json().await.map_err(|e| {
            ProviderError::GenerationFailed(format!(
                "failed to parse response: {}",
                e.without_url()
            ))
        })
    }

    /// Pull the generated text and safety scores out of a response
    ///
    /// Prompt-level blocks and safety-stopped candidates surface as
    /// `SafetyBlocked` carrying whatever ratings came back.
    fn extract_text(
        &self,
        response: &GeminiResponse,
    ) -> Result<(String, SafetyScores), ProviderError> {
        if let Some(feedback) = &response.prompt_feedback
            && let Some(reason) = &feedback.block_reason
        {
            tracing::warn!(provider = %self.name, reason = %reason, "prompt blocked upstream");
            return Err(ProviderError::SafetyBlocked {
                scores: safety::score_ratings(&feedback.safety_ratings),
            });
        }

        let candidate = response.candidates.first().ok_or_else(|| {
            ProviderError::GenerationFailed("no candidates in response".to_owned())
        })?;

        let scores = safety::score_ratings(&candidate.safety_ratings);

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            tracing::warn!(provider = %self.name, "candidate blocked upstream");
            return Err(ProviderError::SafetyBlocked { scores });
        }

        let story_text = candidate
            .content
            .as_ref()
            .map(GeminiContent::text)
            .unwrap_or_default();

        if story_text.is_empty() {
            return Err(ProviderError::GenerationFailed(
                "candidate carried no text".to_owned(),
            ));
        }

        Ok((story_text, scores))
    }

    async fn generate_story_inner(
        &self,
        request: &StoryRequest,
    ) -> Result<StoryResponse, ProviderError> {
        let wire = self.build_story_request(request);
        let response = self.send_generate(&wire).await?;

        let usage = token_usage(response.usage_metadata);
        let (story_text, safety_scores) = self.extract_text(&response)?;

        let (title, content) = prompt::split_title(&story_text, &request.prompt);
        let words = text::word_count(&content);

        let story = StoryResponse {
            title,
            model: self.model.clone(),
            usage,
            safety: safety_scores,
            quality: scoring::quality_metrics(&content, request.age_band, &self.banned_words),
            cost: scoring::estimate_cost(usage, &self.pricing),
            word_count: words,
            reading_time_secs: text::reading_time_secs(words),
            vocabulary_words: text::vocabulary_words(&content, request.age_band),
            content,
        };

        tracing::debug!(
            provider = %self.name,
            model = %story.model,
            words = story.word_count,
            "story generated"
        );

        Ok(story)
    }

    async fn analyze_images_inner(
        &self,
        images: &[ImageContent],
    ) -> Result<(HashMap<ImageId, ImageAnalysis>, TokenUsage), ProviderError> {
        let wire = self.build_analysis_request(images);
        let response = self.send_generate(&wire).await?;

        let usage = token_usage(response.usage_metadata);
        let (analysis_text, _) = self.extract_text(&response)?;
        let analyses = parse_analyses(&analysis_text, images)?;

        tracing::debug!(provider = %self.name, count = analyses.len(), "images analyzed");

        Ok((analyses, usage))
    }

    /// List upstream models, mapping every failure to a message
    async fn probe_models(&self) -> Result<Vec<String>, String> {
        let response = self
            .client
            .get(self.models_url())
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("status {status}: {}", upstream_message(&body)));
        }

        let list: GeminiModelList = response
            .json()
            .await
            .map_err(|e| format!("failed to parse model list: {}", e.without_url()))?;

        Ok(list.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_story(
        &self,
        request: &StoryRequest,
    ) -> Result<StoryResponse, ProviderError> {
        match self.generate_story_inner(request).await {
            Ok(story) => {
                self.usage.record_success(story.usage);
                Ok(story)
            }
            Err(e) => {
                self.usage.record_failure();
                Err(e)
            }
        }
    }

    async fn analyze_images(
        &self,
        images: &[ImageContent],
    ) -> Result<HashMap<ImageId, ImageAnalysis>, ProviderError> {
        if images.is_empty() {
            return Ok(HashMap::new());
        }

        match self.analyze_images_inner(images).await {
            Ok((analyses, usage)) => {
                self.usage.record_success(usage);
                Ok(analyses)
            }
            Err(e) => {
                self.usage.record_failure();
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> ProviderHealth {
        let start = Instant::now();
        match self.probe_models().await {
            Ok(models) => {
                let elapsed = elapsed_ms(start);
                tracing::debug!(provider = %self.name, response_time_ms = elapsed, "health check passed");
                ProviderHealth::up(elapsed, Some(models))
            }
            Err(error) => {
                let elapsed = elapsed_ms(start);
                tracing::warn!(provider = %self.name, error = %error, "health check failed");
                ProviderHealth::down(elapsed, error)
            }
        }
    }

    async fn usage_stats(&self) -> UsageStats {
        self.usage.snapshot()
    }
}

/// One image description from the analysis response
///
/// `child_friendly` defaults to false when the model omits it.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    child_friendly: bool,
}

/// Extract the error message from an upstream error body
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorResponse>(body)
        .map_or_else(|_| body.to_owned(), |parsed| parsed.error.message)
}

/// Parse the retry-after header as whole seconds
fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn token_usage(metadata: Option<GeminiUsageMetadata>) -> TokenUsage {
    metadata.map_or_else(TokenUsage::default, |m| TokenUsage {
        prompt_tokens: m.prompt_token_count,
        completion_tokens: m.candidates_token_count,
        total_tokens: m.total_token_count,
    })
}

/// Strip a surrounding markdown code fence from a model answer
fn strip_fences(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Match returned analyses to input images by position
fn parse_analyses(
    answer: &str,
    images: &[ImageContent],
) -> Result<HashMap<ImageId, ImageAnalysis>, ProviderError> {
    let raw: Vec<RawAnalysis> = serde_json::from_str(strip_fences(answer)).map_err(|e| {
        ProviderError::GenerationFailed(format!("unparseable analysis response: {e}"))
    })?;

    if raw.len() != images.len() {
        return Err(ProviderError::GenerationFailed(format!(
            "expected {} analyses, got {}",
            images.len(),
            raw.len()
        )));
    }

    Ok(images
        .iter()
        .zip(raw)
        .map(|(image, analysis)| {
            (
                image.id,
                ImageAnalysis {
                    image_id: image.id,
                    description: analysis.description,
                    tags: analysis.tags,
                    child_friendly: analysis.child_friendly,
                },
            )
        })
        .collect())
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
