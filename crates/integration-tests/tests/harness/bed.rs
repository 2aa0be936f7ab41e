//! Assembled orchestrator over in-memory collaborators

use std::sync::Arc;

use fable_cache::AnalysisStore;
use fable_config::Config;
use fable_core::{ChildId, FamilyId, ParentId, StoryRequest};
use fable_orchestrator::{
    DefaultProviderPolicy, GenerationStore, Orchestrator, ProviderRegistry, StoryGenerationResult,
};
use fable_quota::QuotaStore;

use super::stores::{MemAnalysisStore, MemGenerationStore, MemImageSource, MemQuotaStore};

/// An orchestrator wired to in-memory stores
pub struct TestBed {
    pub orchestrator: Orchestrator,
    pub generation_store: Arc<MemGenerationStore>,
    pub analysis_store: Arc<MemAnalysisStore>,
}

impl TestBed {
    /// Assemble an orchestrator from the given configuration
    pub fn start(config: &Config) -> anyhow::Result<Self> {
        Self::with_analysis_store(config, Arc::new(MemAnalysisStore::default()))
    }

    /// Assemble an orchestrator sharing a previously warmed analysis store
    pub fn with_analysis_store(
        config: &Config,
        analysis_store: Arc<MemAnalysisStore>,
    ) -> anyhow::Result<Self> {
        super::init_tracing();

        let registry = Arc::new(ProviderRegistry::from_config(config)?);
        let generation_store = Arc::new(MemGenerationStore::default());

        let records: Arc<dyn GenerationStore> = generation_store.clone();
        let analyses: Arc<dyn AnalysisStore> = analysis_store.clone();
        let quota: Arc<dyn QuotaStore> = Arc::new(MemQuotaStore::default());

        let orchestrator = Orchestrator::new(
            registry,
            Arc::new(DefaultProviderPolicy),
            quota,
            analyses,
            records,
            Arc::new(MemImageSource),
            config,
        );

        Ok(Self {
            orchestrator,
            generation_store,
            analysis_store,
        })
    }

    /// Submit a request for a fresh parent
    pub async fn submit(&self, request: StoryRequest) -> StoryGenerationResult {
        self.submit_for(ParentId::new(), request).await
    }

    /// Submit a request for a specific parent
    pub async fn submit_for(
        &self,
        parent: ParentId,
        request: StoryRequest,
    ) -> StoryGenerationResult {
        self.orchestrator
            .submit_generation(parent, ChildId::new(), FamilyId::new(), request)
            .await
    }
}
