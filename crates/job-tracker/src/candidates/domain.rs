use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Store-assigned identifier for a candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a candidate in the hiring pipeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Stage {
    #[default]
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl Stage {
    pub const fn ordered() -> [Stage; 5] {
        [
            Stage::Applied,
            Stage::Screening,
            Stage::Interview,
            Stage::Offer,
            Stage::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Applied => "Applied",
            Stage::Screening => "Screening",
            Stage::Interview => "Interview",
            Stage::Offer => "Offer",
            Stage::Rejected => "Rejected",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Stage::Applied => 0,
            Stage::Screening => 1,
            Stage::Interview => 2,
            Stage::Offer => 3,
            Stage::Rejected => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Stage::ordered()
            .into_iter()
            .find(|stage| stage.label() == value)
            .ok_or_else(|| UnknownStage(value.to_string()))
    }
}

/// Raised when stage text does not name one of the pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid stage")]
pub struct UnknownStage(pub String);

/// Years-of-experience value as it arrives over the wire.
///
/// Browser forms post numbers as text, and an untouched field posts an empty
/// string, so both shapes are accepted and interpreted by [`ExperienceField::years`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceField {
    Number(f64),
    Text(String),
}

impl ExperienceField {
    /// Numeric value when the field holds a finite number.
    pub fn years(&self) -> Option<f64> {
        let value = match self {
            ExperienceField::Number(value) => *value,
            ExperienceField::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ExperienceField::Text(text) if text.trim().is_empty())
    }
}

impl From<f64> for ExperienceField {
    fn from(value: f64) -> Self {
        ExperienceField::Number(value)
    }
}

/// Persisted candidate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    pub name: String,
    pub company: String,
    pub role: String,
    pub current_stage: Stage,
    pub applied_date: NaiveDate,
    pub years_of_experience: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_link: Option<String>,
}

/// Unvalidated creation payload. Constraints are enforced by the store through
/// [`crate::candidates::schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub applied_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<ExperienceField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_link: Option<String>,
}

/// Body of a stage update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdate {
    #[serde(default)]
    pub current_stage: String,
}

impl StageUpdate {
    pub fn new(stage: Stage) -> Self {
        Self {
            current_stage: stage.label().to_string(),
        }
    }
}

/// One row of the server-side stage aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    #[serde(rename = "_id")]
    pub stage: Stage,
    pub count: u64,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping the calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|stamp| stamp.date_naive()))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_date(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
