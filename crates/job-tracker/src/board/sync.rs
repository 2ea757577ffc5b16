use tracing::{debug, error, warn};

use crate::candidates::{CandidateDraft, CandidateId, Stage};

use super::analytics::PipelineAnalytics;
use super::client::{ApiError, CandidateApi};
use super::filter::SearchFilter;
use super::state::{Board, BoardError, CandidateCard, DragOutcome, StageChange};

/// A stage write applied locally and not yet confirmed by a refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub candidate_id: CandidateId,
    pub stage: Stage,
}

impl From<StageChange> for PendingWrite {
    fn from(change: StageChange) -> Self {
        Self {
            candidate_id: change.candidate_id,
            stage: change.stage,
        }
    }
}

/// How the server answered a stage write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Confirmed,
    /// The server answered with an error; the refetch decides what is shown.
    Rejected,
    /// No response. The optimistic move stays until the next load.
    Abandoned,
}

/// What a finished drag did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEffect {
    Ignored,
    Reordered,
    Moved {
        change: StageChange,
        write: WriteOutcome,
        reconciled: bool,
    },
}

/// Owns the board state and keeps it in step with the server.
///
/// Moves are applied locally first and written back; every answered write is
/// followed by a full refetch that replaces local state wholesale, so the last
/// refetch to land wins.
pub struct BoardSync<C> {
    api: C,
    candidates: Vec<CandidateCard>,
    board: Board,
    pending: Vec<PendingWrite>,
}

impl<C> BoardSync<C>
where
    C: CandidateApi,
{
    pub fn new(api: C) -> Self {
        Self {
            api,
            candidates: Vec::new(),
            board: Board::default(),
            pending: Vec::new(),
        }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn candidates(&self) -> &[CandidateCard] {
        &self.candidates
    }

    pub fn pending(&self) -> &[PendingWrite] {
        &self.pending
    }

    pub fn analytics(&self) -> PipelineAnalytics {
        PipelineAnalytics::project(&self.candidates)
    }

    pub fn filtered(&self, filter: &SearchFilter) -> Vec<&CandidateCard> {
        filter.apply(&self.candidates)
    }

    /// Fetch the full list and rebuild local state from it.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.api.list().await {
            Ok(cards) => {
                self.board = Board::replace_all(cards.clone());
                self.candidates = cards;
                self.pending.clear();
                debug!(count = self.candidates.len(), "board reloaded");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "error fetching candidates");
                Err(err)
            }
        }
    }

    /// Submit a new candidate, then reload. The reload also follows a create
    /// the server answered with an error; only a transport failure skips it.
    pub async fn submit(&mut self, draft: &CandidateDraft) -> Result<CandidateCard, ApiError> {
        let created = self.api.create(draft).await;
        if let Err(err) = &created {
            error!(error = %err, "error adding new candidate");
            if !err.has_response() {
                return created;
            }
        }
        // A failed reload is logged by `load` and leaves the previous state.
        self.load().await.ok();
        created
    }

    /// Apply a finished drag. Only an invalid source position is an error;
    /// write failures are logged and reported through [`DragEffect::Moved`].
    pub async fn drag_end(&mut self, drag: DragOutcome) -> Result<DragEffect, BoardError> {
        let Some(action) = Board::plan(&drag) else {
            return Ok(DragEffect::Ignored);
        };

        let transition = self.board.apply(action)?;
        self.board = transition.board;

        let Some(change) = transition.write else {
            return Ok(DragEffect::Reordered);
        };
        self.pending.push(PendingWrite::from(change.clone()));

        let write = match self
            .api
            .update_stage(&change.candidate_id, change.stage)
            .await
        {
            Ok(_) => WriteOutcome::Confirmed,
            Err(err) if err.has_response() => {
                warn!(
                    id = %change.candidate_id,
                    stage = %change.stage,
                    error = %err,
                    "stage update rejected"
                );
                WriteOutcome::Rejected
            }
            Err(err) => {
                error!(
                    id = %change.candidate_id,
                    stage = %change.stage,
                    error = %err,
                    "error updating candidate stage"
                );
                return Ok(DragEffect::Moved {
                    change,
                    write: WriteOutcome::Abandoned,
                    reconciled: false,
                });
            }
        };

        let reconciled = self.load().await.is_ok();
        Ok(DragEffect::Moved {
            change,
            write,
            reconciled,
        })
    }
}
