//! The generation request state machine

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use fable_cache::{AnalysisCache, AnalysisStore, CacheError};
use fable_config::{Config, GenerationConfig};
use fable_core::{
    ChildId, FamilyId, GenerationId, ImageAnalysis, ImageId, ParentId, StoryRequest, StoryResponse,
};
use fable_provider::{Provider, ProviderError, ProviderHealth};
use fable_quota::{QuotaError, QuotaGuard, QuotaStore};

use crate::health::HealthMonitor;
use crate::registry::{ProviderRegistry, SelectionPolicy};
use crate::result::{ImageAnalysisResult, StoryGenerationResult, UserQuotaInfo};
use crate::store::{GenerationStore, ImageSource, RecordUpdate};

/// Drives story generation end to end
///
/// Owns the request state machine: record creation, the quota gate,
/// provider selection, the timed generation call, outcome classification,
/// and persistence through the collaborator stores. Every submission
/// resolves to a typed result; nothing propagates raw and nothing hangs.
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    policy: Arc<dyn SelectionPolicy>,
    quota: QuotaGuard,
    cache: AnalysisCache,
    health: HealthMonitor,
    generation_store: Arc<dyn GenerationStore>,
    image_source: Arc<dyn ImageSource>,
    generation: GenerationConfig,
}

impl Orchestrator {
    /// Assemble the orchestrator from its collaborators and configuration
    pub fn new(
        registry: Arc<ProviderRegistry>,
        policy: Arc<dyn SelectionPolicy>,
        quota_store: Arc<dyn QuotaStore>,
        analysis_store: Arc<dyn AnalysisStore>,
        generation_store: Arc<dyn GenerationStore>,
        image_source: Arc<dyn ImageSource>,
        config: &Config,
    ) -> Self {
        Self {
            health: HealthMonitor::new(
                Arc::clone(&registry),
                config.generation.health_check_timeout(),
            ),
            quota: QuotaGuard::new(quota_store, config.quota),
            cache: AnalysisCache::new(analysis_store, &config.cache),
            registry,
            policy,
            generation_store,
            image_source,
            generation: config.generation.clone(),
        }
    }

    /// Run one story generation request through the full state machine
    ///
    /// The record is created before anything can reject the request, then
    /// the quota gate runs, a provider is selected, referenced images are
    /// resolved into prompt descriptions, and the provider is invoked
    /// under a hard timeout. The terminal record update is applied exactly
    /// once, whatever the outcome.
    pub async fn submit_generation(
        &self,
        parent: ParentId,
        child: ChildId,
        family: FamilyId,
        request: StoryRequest,
    ) -> StoryGenerationResult {
        let started = Instant::now();

        let generation_id = match self
            .generation_store
            .create_record(parent, child, family, &request)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "could not create generation record");
                return StoryGenerationResult::Failed {
                    generation_id: None,
                    retryable: false,
                    retry_after: None,
                    message: "could not record the generation request".to_owned(),
                };
            }
        };
        tracing::debug!(%generation_id, %parent, "generation submitted");

        self.drive(generation_id, parent, request, started).await
    }

    /// Analyze a batch of images, serving cached analyses where possible
    pub async fn analyze_images(&self, image_ids: &[ImageId]) -> ImageAnalysisResult {
        let provider = match self.policy.select(&self.registry) {
            Ok(provider) => provider,
            Err(error) => {
                tracing::warn!(error = %error, "provider selection failed");
                return ImageAnalysisResult::Failed {
                    message: error.to_string(),
                };
            }
        };

        match self.cached_analyses(&provider, image_ids).await {
            Ok(analyses) => ImageAnalysisResult::Succeeded { analyses },
            Err(error) => {
                tracing::warn!(error = %error, "image analysis failed");
                ImageAnalysisResult::Failed {
                    message: error.to_string(),
                }
            }
        }
    }

    /// Current quota position for a user, without consuming any
    pub async fn user_quota(&self, user: ParentId) -> Result<UserQuotaInfo, QuotaError> {
        self.quota.snapshot(user).await.map(UserQuotaInfo::from)
    }

    /// Probe every registered provider concurrently
    pub async fn provider_health(&self) -> HashMap<String, ProviderHealth> {
        self.health.check_all().await
    }

    async fn drive(
        &self,
        generation_id: GenerationId,
        parent: ParentId,
        request: StoryRequest,
        started: Instant,
    ) -> StoryGenerationResult {
        if let Err(error) = self.quota.try_acquire(parent).await {
            return self.quota_rejection(generation_id, error).await;
        }

        let provider = match self.policy.select(&self.registry) {
            Ok(provider) => provider,
            Err(error) => {
                tracing::warn!(%generation_id, error = %error, "provider selection failed");
                return self.fail(generation_id, None, false, error.to_string()).await;
            }
        };
        let provider_name = provider.name().to_owned();
        tracing::debug!(%generation_id, provider = %provider_name, "provider selected");

        let request = match self.enrich_with_images(request, &provider).await {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(%generation_id, error = %error, "image analysis failed");
                return self
                    .fail(generation_id, Some(&provider_name), false, error.to_string())
                    .await;
            }
        };

        let outcome =
            tokio::time::timeout(self.generation.timeout(), provider.generate_story(&request))
                .await;

        match outcome {
            Ok(Ok(response)) => {
                self.complete(generation_id, &provider_name, &request, response, started)
                    .await
            }
            Ok(Err(error)) => {
                self.provider_rejection(generation_id, &provider_name, error)
                    .await
            }
            Err(_) => {
                tracing::warn!(
                    %generation_id,
                    provider = %provider_name,
                    timeout_secs = self.generation.timeout_secs,
                    "generation timed out"
                );
                let message = format!(
                    "generation timed out after {}s",
                    self.generation.timeout_secs
                );
                self.fail(generation_id, Some(&provider_name), true, message)
                    .await
            }
        }
    }

    async fn complete(
        &self,
        generation_id: GenerationId,
        provider: &str,
        request: &StoryRequest,
        response: StoryResponse,
        started: Instant,
    ) -> StoryGenerationResult {
        let artifact_id = match self
            .generation_store
            .create_artifact(generation_id, &response, request)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(%generation_id, error = %e, "could not persist story artifact");
                return self
                    .fail(
                        generation_id,
                        Some(provider),
                        false,
                        "could not persist the generated story".to_owned(),
                    )
                    .await;
            }
        };

        self.finish_record(
            generation_id,
            RecordUpdate::completed(artifact_id, provider, response.cost),
        )
        .await;

        let elapsed_ms = elapsed_ms(started);
        tracing::info!(
            %generation_id,
            provider,
            cost = response.cost,
            elapsed_ms,
            "story generated"
        );

        StoryGenerationResult::Succeeded {
            generation_id,
            artifact_id,
            title: response.title,
            content: response.content,
            safety: response.safety,
            quality: response.quality,
            cost: response.cost,
            provider: provider.to_owned(),
            elapsed_ms,
        }
    }

    async fn quota_rejection(
        &self,
        generation_id: GenerationId,
        error: QuotaError,
    ) -> StoryGenerationResult {
        let detail = error.to_string();
        self.finish_record(generation_id, RecordUpdate::failed(detail.clone()))
            .await;

        match error {
            QuotaError::Exceeded {
                scope,
                limit,
                resets_at,
            } => {
                tracing::info!(%generation_id, %scope, limit, "generation rejected by quota");
                StoryGenerationResult::QuotaRejected {
                    generation_id,
                    scope,
                    limit,
                    resets_at,
                }
            }
            QuotaError::Store(_) => {
                tracing::warn!(%generation_id, error = %detail, "quota store failed");
                StoryGenerationResult::Failed {
                    generation_id: Some(generation_id),
                    retryable: false,
                    retry_after: None,
                    message: detail,
                }
            }
        }
    }

    async fn provider_rejection(
        &self,
        generation_id: GenerationId,
        provider: &str,
        error: ProviderError,
    ) -> StoryGenerationResult {
        tracing::warn!(%generation_id, provider, error = %error, "provider call failed");
        self.finish_record(
            generation_id,
            RecordUpdate::failed(error.to_string()).with_provider(provider),
        )
        .await;

        match error {
            ProviderError::SafetyBlocked { scores } => StoryGenerationResult::SafetyRejected {
                generation_id,
                scores,
            },
            error => StoryGenerationResult::Failed {
                generation_id: Some(generation_id),
                retryable: error.is_retryable(),
                retry_after: error.retry_after(),
                message: error.to_string(),
            },
        }
    }

    async fn fail(
        &self,
        generation_id: GenerationId,
        provider: Option<&str>,
        retryable: bool,
        message: String,
    ) -> StoryGenerationResult {
        let mut update = RecordUpdate::failed(message.clone());
        if let Some(provider) = provider {
            update = update.with_provider(provider);
        }
        self.finish_record(generation_id, update).await;

        StoryGenerationResult::Failed {
            generation_id: Some(generation_id),
            retryable,
            retry_after: None,
            message,
        }
    }

    /// Fold referenced images into the request as scene descriptions
    ///
    /// Analyses marked not child-friendly are dropped rather than woven
    /// into the prompt.
    async fn enrich_with_images(
        &self,
        mut request: StoryRequest,
        provider: &Arc<dyn Provider>,
    ) -> Result<StoryRequest, CacheError> {
        if request.image_ids.is_empty() {
            return Ok(request);
        }

        let analyses = self.cached_analyses(provider, &request.image_ids).await?;
        for id in &request.image_ids {
            match analyses.get(id) {
                Some(analysis) if analysis.child_friendly => {
                    request.image_descriptions.push(analysis.description.clone());
                }
                Some(_) => {
                    tracing::debug!(image = %id, "image left out of the prompt");
                }
                None => {}
            }
        }
        Ok(request)
    }

    async fn cached_analyses(
        &self,
        provider: &Arc<dyn Provider>,
        image_ids: &[ImageId],
    ) -> Result<HashMap<ImageId, ImageAnalysis>, CacheError> {
        let image_source = Arc::clone(&self.image_source);
        let provider = Arc::clone(provider);
        let timeout = self.generation.timeout();

        self.cache
            .get_or_analyze(image_ids, move |missing| async move {
                let images = image_source
                    .load(&missing)
                    .await
                    .map_err(|e| format!("{e:#}"))?;
                match tokio::time::timeout(timeout, provider.analyze_images(&images)).await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(_) => Err(format!(
                        "image analysis timed out after {}s",
                        timeout.as_secs()
                    )),
                }
            })
            .await
    }

    /// Apply the terminal record update
    ///
    /// A persistence failure here is logged and does not change the
    /// outcome returned to the caller.
    async fn finish_record(&self, id: GenerationId, update: RecordUpdate) {
        if let Err(e) = self.generation_store.update_record(id, update).await {
            tracing::warn!(generation_id = %id, error = %e, "terminal record update failed");
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
