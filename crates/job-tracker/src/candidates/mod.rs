//! Candidate records, their stage lifecycle and the HTTP surface over them.

pub mod domain;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_date, Candidate, CandidateDraft, CandidateId, ExperienceField, Stage, StageCount,
    StageUpdate, UnknownStage,
};
pub use repository::{tally_stages, CandidateRepository, RepositoryError};
pub use router::candidate_router;
pub use schema::{NewCandidate, ValidationError};
pub use service::{CandidateService, CandidateServiceError};
