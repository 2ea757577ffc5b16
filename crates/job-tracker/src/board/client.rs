use async_trait::async_trait;
use reqwest::StatusCode;

use crate::candidates::{CandidateDraft, CandidateId, Stage, StageCount, StageUpdate};

use super::state::CandidateCard;

/// The candidate endpoints as seen from the board.
#[async_trait]
pub trait CandidateApi: Send + Sync {
    async fn list(&self) -> Result<Vec<CandidateCard>, ApiError>;
    async fn create(&self, draft: &CandidateDraft) -> Result<CandidateCard, ApiError>;
    async fn update_stage(&self, id: &CandidateId, stage: Stage)
        -> Result<CandidateCard, ApiError>;
    async fn stage_counts(&self) -> Result<Vec<StageCount>, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    #[error("candidate {0} not found")]
    NotFound(CandidateId),
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server answered at all; answered requests are followed by a refetch.
    pub fn has_response(&self) -> bool {
        !matches!(self, ApiError::Transport(_))
    }
}

/// `CandidateApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCandidateApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCandidateApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T>(response: reqwest::Response) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

#[async_trait]
impl CandidateApi for HttpCandidateApi {
    async fn list(&self) -> Result<Vec<CandidateCard>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/candidates"))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn create(&self, draft: &CandidateDraft) -> Result<CandidateCard, ApiError> {
        let response = self
            .http
            .post(self.url("/api/candidates"))
            .json(draft)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn update_stage(
        &self,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<CandidateCard, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/candidates/{id}")))
            .json(&StageUpdate::new(stage))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.clone()));
        }
        decode(response).await
    }

    async fn stage_counts(&self) -> Result<Vec<StageCount>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/analytics/stages"))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}
