use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::candidates::domain::{
    Candidate, CandidateDraft, CandidateId, ExperienceField, Stage, StageCount,
};
use crate::candidates::repository::{tally_stages, CandidateRepository, RepositoryError};
use crate::candidates::{candidate_router, CandidateService};

pub(super) fn draft(name: &str, role: &str, company: &str) -> CandidateDraft {
    CandidateDraft {
        name: name.to_string(),
        company: company.to_string(),
        role: role.to_string(),
        current_stage: None,
        applied_date: NaiveDate::from_ymd_opt(2025, 4, 7),
        years_of_experience: Some(ExperienceField::Number(3.0)),
        resume_link: Some("https://example.com/cv.pdf".to_string()),
    }
}

pub(super) fn build_service() -> (CandidateService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = CandidateService::new(repository.clone());
    (service, repository)
}

pub(super) fn router_with_service(service: CandidateService<MemoryRepository>) -> axum::Router {
    candidate_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<Candidate>>>,
}

#[async_trait]
impl CandidateRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Candidate>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    async fn insert(&self, draft: CandidateDraft) -> Result<Candidate, RepositoryError> {
        let candidate = draft.validate()?.into_candidate(CandidateId::generate());
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(candidate.clone());
        Ok(candidate)
    }

    async fn fetch(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|candidate| &candidate.id == id).cloned())
    }

    async fn update_stage(
        &self,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<Candidate, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let candidate = guard
            .iter_mut()
            .find(|candidate| &candidate.id == id)
            .ok_or(RepositoryError::NotFound)?;
        candidate.current_stage = stage;
        Ok(candidate.clone())
    }

    async fn stage_counts(&self) -> Result<Vec<StageCount>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(tally_stages(guard.iter()))
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl CandidateRepository for UnavailableRepository {
    async fn list(&self) -> Result<Vec<Candidate>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn insert(&self, _draft: CandidateDraft) -> Result<Candidate, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn update_stage(
        &self,
        _id: &CandidateId,
        _stage: Stage,
    ) -> Result<Candidate, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn stage_counts(&self) -> Result<Vec<StageCount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
