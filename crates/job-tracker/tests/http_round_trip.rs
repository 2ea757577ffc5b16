//! The board client driving the real candidate router over a loopback socket.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_tracker::board::{
    ApiError, BoardSync, CandidateApi, Column, DragEffect, DragLocation, DragOutcome,
    HttpCandidateApi, WriteOutcome,
};
use job_tracker::candidates::{
    candidate_router, tally_stages, Candidate, CandidateDraft, CandidateId, CandidateRepository,
    CandidateService, ExperienceField, RepositoryError, Stage, StageCount,
};

#[derive(Default)]
struct MemoryRepository {
    records: Mutex<Vec<Candidate>>,
}

#[async_trait]
impl CandidateRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Candidate>, RepositoryError> {
        Ok(self.records.lock().expect("records mutex").clone())
    }

    async fn insert(&self, draft: CandidateDraft) -> Result<Candidate, RepositoryError> {
        let candidate = draft.validate()?.into_candidate(CandidateId::generate());
        self.records
            .lock()
            .expect("records mutex")
            .push(candidate.clone());
        Ok(candidate)
    }

    async fn fetch(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let records = self.records.lock().expect("records mutex");
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    async fn update_stage(
        &self,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<Candidate, RepositoryError> {
        let mut records = self.records.lock().expect("records mutex");
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.current_stage = stage;
        Ok(record.clone())
    }

    async fn stage_counts(&self) -> Result<Vec<StageCount>, RepositoryError> {
        Ok(tally_stages(self.records.lock().expect("records mutex").iter()))
    }
}

async fn spawn_server() -> HttpCandidateApi {
    let service = Arc::new(CandidateService::new(Arc::new(MemoryRepository::default())));
    let app = candidate_router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });
    HttpCandidateApi::new(format!("http://{addr}"))
}

fn draft(name: &str, years: f64) -> CandidateDraft {
    CandidateDraft {
        name: name.to_string(),
        company: "Initech".to_string(),
        role: "Engineer".to_string(),
        current_stage: None,
        applied_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 2),
        years_of_experience: Some(ExperienceField::Number(years)),
        resume_link: None,
    }
}

#[tokio::test]
async fn created_candidates_land_in_applied_column() {
    let api = spawn_server().await;
    let mut sync = BoardSync::new(api);

    sync.submit(&draft("Ada", 2.0)).await.expect("created");
    sync.submit(&draft("Grace", 4.0)).await.expect("created");

    let applied = sync.board().column(Stage::Applied.into());
    assert_eq!(applied.len(), 2);
    assert_eq!(sync.analytics().average_experience.to_string(), "3.0");
}

#[tokio::test]
async fn drag_across_columns_persists_stage() {
    let api = spawn_server().await;
    let mut sync = BoardSync::new(api);
    let created = sync.submit(&draft("Ada", 2.0)).await.expect("created");

    let effect = sync
        .drag_end(DragOutcome {
            source: DragLocation::new(Stage::Applied, 0),
            destination: Some(DragLocation::new(Stage::Interview, 0)),
        })
        .await
        .expect("valid drag");

    assert!(matches!(
        effect,
        DragEffect::Moved {
            write: WriteOutcome::Confirmed,
            reconciled: true,
            ..
        }
    ));
    let interview = sync.board().column(Column::Stage(Stage::Interview));
    assert_eq!(interview.len(), 1);
    assert_eq!(interview[0].id, created.id);

    let counts = sync.api().stage_counts().await.expect("aggregation");
    assert_eq!(
        counts,
        vec![StageCount {
            stage: Stage::Interview,
            count: 1
        }]
    );
}

#[tokio::test]
async fn unknown_id_maps_to_not_found() {
    let api = spawn_server().await;

    let err = api
        .update_stage(&CandidateId("missing".to_string()), Stage::Offer)
        .await
        .expect_err("unknown id");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn invalid_draft_is_a_server_error() {
    let api = spawn_server().await;
    let mut incomplete = draft("Ada", 1.0);
    incomplete.applied_date = None;

    match api.create(&incomplete).await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("appliedDate"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let mut sync = BoardSync::new(HttpCandidateApi::new(format!("http://{addr}")));

    let err = sync.load().await.expect_err("nothing listening");
    assert!(!err.has_response());
}
