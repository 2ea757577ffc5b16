use std::str::FromStr;

use crate::candidates::{Stage, UnknownStage};

use super::state::CandidateCard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageFilter {
    #[default]
    All,
    Only(Stage),
}

impl FromStr for StageFilter {
    type Err = UnknownStage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(StageFilter::All);
        }
        value.trim().parse().map(StageFilter::Only)
    }
}

/// List-view search. Only narrows what is rendered; the board is never filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub term: String,
    pub stage: StageFilter,
}

impl SearchFilter {
    pub fn new(term: impl Into<String>, stage: StageFilter) -> Self {
        Self {
            term: term.into(),
            stage,
        }
    }

    pub fn matches(&self, card: &CandidateCard) -> bool {
        let stage_matches = match self.stage {
            StageFilter::All => true,
            StageFilter::Only(stage) => card.current_stage == stage.label(),
        };
        if !stage_matches {
            return false;
        }

        let term = self.term.to_lowercase();
        term.is_empty()
            || [&card.name, &card.role, &card.company]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
    }

    pub fn apply<'a>(&self, cards: &'a [CandidateCard]) -> Vec<&'a CandidateCard> {
        cards.iter().filter(|card| self.matches(card)).collect()
    }
}
