use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::candidates::{CandidateId, ExperienceField, Stage};

/// Client-side mirror of a candidate record as returned by the list endpoint.
///
/// Stage and experience are kept loose so a record the client cannot classify
/// still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCard {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub current_stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<ExperienceField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_link: Option<String>,
}

impl CandidateCard {
    pub fn stage(&self) -> Option<Stage> {
        self.current_stage.parse().ok()
    }
}

/// A board column: one per stage plus a catch-all for unrecognised stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Stage(Stage),
    Unassigned,
}

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Column::Stage(stage) => stage.label(),
            Column::Unassigned => "Unassigned",
        }
    }
}

impl From<Stage> for Column {
    fn from(stage: Stage) -> Self {
        Column::Stage(stage)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Card position reported by a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub column: Column,
    pub index: usize,
}

impl DragLocation {
    pub fn new(column: impl Into<Column>, index: usize) -> Self {
        Self {
            column: column.into(),
            index,
        }
    }
}

/// End of a drag gesture; `destination` is `None` when dropped outside any column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

/// Board transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    ReplaceAll(Vec<CandidateCard>),
    Reorder {
        column: Column,
        from: usize,
        to: usize,
    },
    Move {
        source: Column,
        destination: Stage,
        from: usize,
        to: usize,
    },
}

/// Stage write-back produced by a cross-column move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageChange {
    pub candidate_id: CandidateId,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("no card at index {index} in column {column} (length {len})")]
    IndexOutOfRange {
        column: Column,
        index: usize,
        len: usize,
    },
}

/// Result of applying an action: the next board and any write the caller owes
/// the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub board: Board,
    pub write: Option<StageChange>,
}

/// Candidates grouped into stage columns, ordered as displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    lanes: [Vec<CandidateCard>; 5],
    unassigned: Vec<CandidateCard>,
}

impl Board {
    /// Rebuild the board from a full candidate list, keeping list order per column.
    pub fn replace_all(cards: Vec<CandidateCard>) -> Self {
        let mut board = Board::default();
        for card in cards {
            match card.stage() {
                Some(stage) => board.lanes[stage.index()].push(card),
                None => {
                    warn!(
                        id = %card.id,
                        stage = %card.current_stage,
                        "card with unknown stage placed in unassigned column"
                    );
                    board.unassigned.push(card);
                }
            }
        }
        board
    }

    pub fn column(&self, column: Column) -> &[CandidateCard] {
        match column {
            Column::Stage(stage) => &self.lanes[stage.index()],
            Column::Unassigned => &self.unassigned,
        }
    }

    fn column_mut(&mut self, column: Column) -> &mut Vec<CandidateCard> {
        match column {
            Column::Stage(stage) => &mut self.lanes[stage.index()],
            Column::Unassigned => &mut self.unassigned,
        }
    }

    /// Stage columns in pipeline order, followed by the unassigned column when
    /// it holds anything.
    pub fn columns(&self) -> Vec<(Column, &[CandidateCard])> {
        let mut columns: Vec<(Column, &[CandidateCard])> = Stage::ordered()
            .into_iter()
            .map(|stage| (Column::Stage(stage), self.lanes[stage.index()].as_slice()))
            .collect();
        if !self.unassigned.is_empty() {
            columns.push((Column::Unassigned, self.unassigned.as_slice()));
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translate a drag gesture into an action. Drops outside the board, or onto
    /// the unassigned column from elsewhere, produce nothing.
    pub fn plan(drag: &DragOutcome) -> Option<BoardAction> {
        let destination = drag.destination?;
        let source = drag.source;

        if source.column == destination.column {
            return Some(BoardAction::Reorder {
                column: source.column,
                from: source.index,
                to: destination.index,
            });
        }

        match destination.column {
            Column::Stage(stage) => Some(BoardAction::Move {
                source: source.column,
                destination: stage,
                from: source.index,
                to: destination.index,
            }),
            Column::Unassigned => None,
        }
    }

    pub fn apply(&self, action: BoardAction) -> Result<Transition, BoardError> {
        match action {
            BoardAction::ReplaceAll(cards) => Ok(Transition {
                board: Board::replace_all(cards),
                write: None,
            }),
            BoardAction::Reorder { column, from, to } => Ok(Transition {
                board: self.reorder(column, from, to)?,
                write: None,
            }),
            BoardAction::Move {
                source,
                destination,
                from,
                to,
            } => {
                let (board, change) = self.move_card(source, destination, from, to)?;
                Ok(Transition {
                    board,
                    write: Some(change),
                })
            }
        }
    }

    /// Move a card within one column. Ordering is view-only and never persisted.
    pub fn reorder(&self, column: Column, from: usize, to: usize) -> Result<Board, BoardError> {
        let mut next = self.clone();
        let cards = next.column_mut(column);
        let card = take(cards, column, from)?;
        let to = to.min(cards.len());
        cards.insert(to, card);
        Ok(next)
    }

    /// Move a card into another stage column, patching its stage optimistically.
    pub fn move_card(
        &self,
        source: Column,
        destination: Stage,
        from: usize,
        to: usize,
    ) -> Result<(Board, StageChange), BoardError> {
        let mut next = self.clone();
        let mut card = take(next.column_mut(source), source, from)?;
        card.current_stage = destination.label().to_string();
        let change = StageChange {
            candidate_id: card.id.clone(),
            stage: destination,
        };

        let lane = &mut next.lanes[destination.index()];
        let to = to.min(lane.len());
        lane.insert(to, card);
        Ok((next, change))
    }
}

fn take(
    cards: &mut Vec<CandidateCard>,
    column: Column,
    index: usize,
) -> Result<CandidateCard, BoardError> {
    if index >= cards.len() {
        return Err(BoardError::IndexOutOfRange {
            column,
            index,
            len: cards.len(),
        });
    }
    Ok(cards.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, stage: &str) -> CandidateCard {
        CandidateCard {
            id: CandidateId(id.to_string()),
            name: id.to_string(),
            company: "Initech".to_string(),
            role: "Engineer".to_string(),
            current_stage: stage.to_string(),
            applied_date: None,
            years_of_experience: None,
            resume_link: None,
        }
    }

    fn ids(cards: &[CandidateCard]) -> Vec<&str> {
        cards.iter().map(|card| card.id.as_str()).collect()
    }

    #[test]
    fn replace_all_partitions_by_stage_and_keeps_unknowns() {
        let board = Board::replace_all(vec![
            card("a", "Applied"),
            card("b", "Offer"),
            card("c", "Applied"),
            card("d", "Hired"),
        ]);

        assert_eq!(ids(board.column(Stage::Applied.into())), vec!["a", "c"]);
        assert_eq!(ids(board.column(Stage::Offer.into())), vec!["b"]);
        assert_eq!(ids(board.column(Column::Unassigned)), vec!["d"]);
        assert_eq!(board.len(), 4);
        assert_eq!(board.columns().len(), 6);
    }

    #[test]
    fn unassigned_column_is_hidden_when_empty() {
        let board = Board::replace_all(vec![card("a", "Applied")]);
        let labels: Vec<&str> = board
            .columns()
            .into_iter()
            .map(|(column, _)| column.label())
            .collect();
        assert_eq!(
            labels,
            vec!["Applied", "Screening", "Interview", "Offer", "Rejected"]
        );
    }

    #[test]
    fn reorder_moves_first_card_to_end() {
        let board = Board::replace_all(vec![
            card("A", "Screening"),
            card("B", "Screening"),
            card("C", "Screening"),
        ]);

        let next = board
            .reorder(Stage::Screening.into(), 0, 2)
            .expect("indices valid");

        assert_eq!(ids(next.column(Stage::Screening.into())), vec!["B", "C", "A"]);
        assert_eq!(
            ids(board.column(Stage::Screening.into())),
            vec!["A", "B", "C"],
            "reducers leave the input board untouched"
        );
    }

    #[test]
    fn reorder_clamps_destination_past_end() {
        let board = Board::replace_all(vec![card("A", "Offer"), card("B", "Offer")]);
        let next = board
            .reorder(Stage::Offer.into(), 0, 10)
            .expect("source valid");
        assert_eq!(ids(next.column(Stage::Offer.into())), vec!["B", "A"]);
    }

    #[test]
    fn reorder_rejects_missing_source() {
        let board = Board::replace_all(vec![card("A", "Offer")]);
        assert_eq!(
            board.reorder(Stage::Offer.into(), 3, 0),
            Err(BoardError::IndexOutOfRange {
                column: Column::Stage(Stage::Offer),
                index: 3,
                len: 1,
            })
        );
    }

    #[test]
    fn move_card_inserts_at_destination_index_and_reports_write() {
        let board = Board::replace_all(vec![
            card("a", "Applied"),
            card("b", "Applied"),
            card("x", "Interview"),
            card("y", "Interview"),
        ]);

        let (next, change) = board
            .move_card(Stage::Applied.into(), Stage::Interview, 1, 1)
            .expect("indices valid");

        assert_eq!(ids(next.column(Stage::Applied.into())), vec!["a"]);
        assert_eq!(ids(next.column(Stage::Interview.into())), vec!["x", "b", "y"]);
        assert_eq!(next.column(Stage::Interview.into())[1].current_stage, "Interview");
        assert_eq!(
            change,
            StageChange {
                candidate_id: CandidateId("b".to_string()),
                stage: Stage::Interview,
            }
        );
        assert_eq!(next.len(), board.len());
    }

    #[test]
    fn cards_can_leave_the_unassigned_column() {
        let board = Board::replace_all(vec![card("d", "Hired")]);
        let (next, change) = board
            .move_card(Column::Unassigned, Stage::Offer, 0, 0)
            .expect("indices valid");
        assert!(next.column(Column::Unassigned).is_empty());
        assert_eq!(change.stage, Stage::Offer);
    }

    #[test]
    fn plan_maps_gestures_to_actions() {
        let same_column = DragOutcome {
            source: DragLocation::new(Stage::Applied, 0),
            destination: Some(DragLocation::new(Stage::Applied, 2)),
        };
        assert_eq!(
            Board::plan(&same_column),
            Some(BoardAction::Reorder {
                column: Column::Stage(Stage::Applied),
                from: 0,
                to: 2,
            })
        );

        let across = DragOutcome {
            source: DragLocation::new(Stage::Applied, 1),
            destination: Some(DragLocation::new(Stage::Offer, 0)),
        };
        assert_eq!(
            Board::plan(&across),
            Some(BoardAction::Move {
                source: Column::Stage(Stage::Applied),
                destination: Stage::Offer,
                from: 1,
                to: 0,
            })
        );

        let outside = DragOutcome {
            source: DragLocation::new(Stage::Applied, 0),
            destination: None,
        };
        assert_eq!(Board::plan(&outside), None);

        let into_unassigned = DragOutcome {
            source: DragLocation::new(Stage::Applied, 0),
            destination: Some(DragLocation::new(Column::Unassigned, 0)),
        };
        assert_eq!(Board::plan(&into_unassigned), None);
    }

    #[test]
    fn apply_returns_write_only_for_moves() {
        let board = Board::replace_all(vec![card("a", "Applied"), card("b", "Applied")]);

        let reordered = board
            .apply(BoardAction::Reorder {
                column: Stage::Applied.into(),
                from: 0,
                to: 1,
            })
            .expect("valid");
        assert!(reordered.write.is_none());

        let moved = board
            .apply(BoardAction::Move {
                source: Stage::Applied.into(),
                destination: Stage::Rejected,
                from: 0,
                to: 0,
            })
            .expect("valid");
        assert_eq!(
            moved.write.map(|change| change.candidate_id),
            Some(CandidateId("a".to_string()))
        );

        let replaced = board
            .apply(BoardAction::ReplaceAll(Vec::new()))
            .expect("valid");
        assert!(replaced.board.is_empty());
    }
}
