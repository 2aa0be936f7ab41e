//! In-memory collaborator stores

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fable_cache::AnalysisStore;
use fable_core::{
    ArtifactId, ChildId, FamilyId, GenerationId, GenerationRecord, GenerationStatus, ImageAnalysis,
    ImageContent, ImageId, ParentId, StoryArtifact, StoryRequest, StoryResponse, now_secs,
};
use fable_orchestrator::{GenerationStore, ImageSource, RecordUpdate};
use fable_quota::{QuotaState, QuotaStore};

/// Generation records and story artifacts held in maps
#[derive(Default)]
pub struct MemGenerationStore {
    records: Mutex<HashMap<GenerationId, GenerationRecord>>,
    artifacts: Mutex<HashMap<ArtifactId, StoryArtifact>>,
}

impl MemGenerationStore {
    pub fn record(&self, id: GenerationId) -> GenerationRecord {
        self.records.lock().unwrap()[&id].clone()
    }

    pub fn artifact(&self, id: ArtifactId) -> StoryArtifact {
        self.artifacts.lock().unwrap()[&id].clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationStore for MemGenerationStore {
    async fn create_record(
        &self,
        parent: ParentId,
        child: ChildId,
        family: FamilyId,
        _request: &StoryRequest,
    ) -> anyhow::Result<GenerationId> {
        let record = GenerationRecord {
            id: GenerationId::new(),
            parent_id: parent,
            child_id: child,
            family_id: family,
            status: GenerationStatus::Pending,
            provider: None,
            cost: None,
            artifact_id: None,
            error: None,
            created_at: now_secs(),
            completed_at: None,
        };
        let id = record.id;
        self.records.lock().unwrap().insert(id, record);
        Ok(id)
    }

    async fn update_record(&self, id: GenerationId, update: RecordUpdate) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).expect("record exists");
        assert_eq!(
            record.status,
            GenerationStatus::Pending,
            "terminal update applied twice"
        );
        record.status = update.status;
        record.artifact_id = update.artifact_id;
        record.error = update.error;
        record.provider = update.provider;
        record.cost = update.cost;
        record.completed_at = Some(now_secs());
        Ok(())
    }

    async fn create_artifact(
        &self,
        generation_id: GenerationId,
        response: &StoryResponse,
        request: &StoryRequest,
    ) -> anyhow::Result<ArtifactId> {
        let artifact = StoryArtifact {
            id: ArtifactId::new(),
            generation_id,
            title: response.title.clone(),
            content: response.content.clone(),
            safety: response.safety.clone(),
            quality: response.quality,
            request: request.clone(),
            created_at: now_secs(),
        };
        let id = artifact.id;
        self.artifacts.lock().unwrap().insert(id, artifact);
        Ok(id)
    }
}

/// Quota windows held in a map
#[derive(Default)]
pub struct MemQuotaStore {
    states: Mutex<HashMap<ParentId, QuotaState>>,
}

#[async_trait]
impl QuotaStore for MemQuotaStore {
    async fn load(&self, user: ParentId) -> anyhow::Result<Option<QuotaState>> {
        Ok(self.states.lock().unwrap().get(&user).copied())
    }

    async fn save(&self, user: ParentId, state: QuotaState) -> anyhow::Result<()> {
        self.states.lock().unwrap().insert(user, state);
        Ok(())
    }
}

/// Analyses held in a map
#[derive(Default)]
pub struct MemAnalysisStore {
    analyses: Mutex<HashMap<ImageId, ImageAnalysis>>,
}

#[async_trait]
impl AnalysisStore for MemAnalysisStore {
    async fn cached(&self, ids: &[ImageId]) -> anyhow::Result<HashMap<ImageId, ImageAnalysis>> {
        let analyses = self.analyses.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| analyses.get(id).map(|a| (*id, a.clone())))
            .collect())
    }

    async fn store(&self, analyses: &HashMap<ImageId, ImageAnalysis>) -> anyhow::Result<()> {
        self.analyses
            .lock()
            .unwrap()
            .extend(analyses.iter().map(|(id, a)| (*id, a.clone())));
        Ok(())
    }
}

/// Serves a small PNG stub for any requested image
pub struct MemImageSource;

#[async_trait]
impl ImageSource for MemImageSource {
    async fn load(&self, ids: &[ImageId]) -> anyhow::Result<Vec<ImageContent>> {
        Ok(ids
            .iter()
            .map(|&id| ImageContent {
                id,
                mime_type: "image/png".to_owned(),
                data: vec![137, 80, 78, 71, 13, 10, 26, 10],
            })
            .collect())
    }
}
