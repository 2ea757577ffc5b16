use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Candidate, CandidateDraft, CandidateId, Stage, StageCount, StageUpdate};
use super::repository::{CandidateRepository, RepositoryError};
use super::schema::ValidationError;

/// Stateless operations behind the candidate HTTP surface.
pub struct CandidateService<R> {
    repository: Arc<R>,
}

impl<R> CandidateService<R>
where
    R: CandidateRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Candidate>, CandidateServiceError> {
        Ok(self.repository.list().await?)
    }

    /// Store a new candidate; the store assigns the id and the default stage.
    pub async fn create(&self, draft: CandidateDraft) -> Result<Candidate, CandidateServiceError> {
        let candidate = self.repository.insert(draft).await?;
        info!(id = %candidate.id, stage = %candidate.current_stage, "candidate created");
        Ok(candidate)
    }

    /// Move a candidate to another stage. The stage text is checked here so an
    /// invalid value never reaches the store.
    pub async fn update_stage(
        &self,
        id: &CandidateId,
        update: StageUpdate,
    ) -> Result<Candidate, CandidateServiceError> {
        let stage = update
            .current_stage
            .trim()
            .parse::<Stage>()
            .map_err(ValidationError::from)?;

        match self.repository.update_stage(id, stage).await {
            Ok(candidate) => {
                info!(%id, %stage, "candidate stage updated");
                Ok(candidate)
            }
            Err(RepositoryError::NotFound) => {
                warn!(%id, "stage update for unknown candidate");
                Err(RepositoryError::NotFound.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn stage_analytics(&self) -> Result<Vec<StageCount>, CandidateServiceError> {
        Ok(self.repository.stage_counts().await?)
    }
}

/// Error raised by the candidate service.
#[derive(Debug, thiserror::Error)]
pub enum CandidateServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CandidateServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CandidateServiceError::Repository(RepositoryError::NotFound)
        )
    }
}
