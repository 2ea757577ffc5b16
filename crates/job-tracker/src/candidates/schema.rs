//! Field constraints every candidate store applies before a record is written.

use chrono::NaiveDate;

use super::domain::{Candidate, CandidateDraft, CandidateId, Stage, UnknownStage};

/// A draft that satisfied the schema and only lacks its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub name: String,
    pub company: String,
    pub role: String,
    pub current_stage: Stage,
    pub applied_date: NaiveDate,
    pub years_of_experience: f64,
    pub resume_link: Option<String>,
}

impl NewCandidate {
    pub fn into_candidate(self, id: CandidateId) -> Candidate {
        Candidate {
            id,
            name: self.name,
            company: self.company,
            role: self.role,
            current_stage: self.current_stage,
            applied_date: self.applied_date,
            years_of_experience: self.years_of_experience,
            resume_link: self.resume_link,
        }
    }
}

/// Constraint violations raised by the schema layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("`{field}` is required")]
    MissingField { field: &'static str },
    #[error(transparent)]
    InvalidStage(#[from] UnknownStage),
    #[error("`yearsOfExperience` must be a non-negative number")]
    InvalidExperience,
    #[error("schema constraint rejected write: {0}")]
    Constraint(String),
}

impl CandidateDraft {
    pub fn validate(self) -> Result<NewCandidate, ValidationError> {
        let name = required("name", self.name)?;
        let company = required("company", self.company)?;
        let role = required("role", self.role)?;

        let current_stage = match self.current_stage.as_deref().map(str::trim) {
            None | Some("") => Stage::default(),
            Some(raw) => raw.parse::<Stage>()?,
        };

        let applied_date = self.applied_date.ok_or(ValidationError::MissingField {
            field: "appliedDate",
        })?;

        let years_of_experience = match self.years_of_experience {
            None => 0.0,
            Some(field) if field.is_blank() => 0.0,
            Some(field) => field
                .years()
                .filter(|years| *years >= 0.0)
                .ok_or(ValidationError::InvalidExperience)?,
        };

        let resume_link = self
            .resume_link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty());

        Ok(NewCandidate {
            name,
            company,
            role,
            current_stage,
            applied_date,
            years_of_experience,
            resume_link,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}
