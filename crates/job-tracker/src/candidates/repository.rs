use async_trait::async_trait;

use super::domain::{Candidate, CandidateDraft, CandidateId, Stage, StageCount};
use super::schema::ValidationError;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations own id assignment and must run [`CandidateDraft::validate`]
/// before writing.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Candidate>, RepositoryError>;
    async fn insert(&self, draft: CandidateDraft) -> Result<Candidate, RepositoryError>;
    async fn fetch(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    async fn update_stage(
        &self,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<Candidate, RepositoryError>;
    async fn stage_counts(&self) -> Result<Vec<StageCount>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Group counts in pipeline order, omitting stages nobody occupies.
pub fn tally_stages<'a, I>(candidates: I) -> Vec<StageCount>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    let mut counts = [0_u64; 5];
    for candidate in candidates {
        counts[candidate.current_stage.index()] += 1;
    }

    Stage::ordered()
        .into_iter()
        .filter(|stage| counts[stage.index()] > 0)
        .map(|stage| StageCount {
            stage,
            count: counts[stage.index()],
        })
        .collect()
}
