use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::state::CandidateCard;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTally {
    pub stage: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleTally {
    pub role: String,
    pub count: usize,
}

/// Mean years of experience, or `NotAvailable` when no card carries a usable value.
///
/// The mean is kept unrounded; it is rendered with one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageExperience {
    Years(f64),
    NotAvailable,
}

impl fmt::Display for AverageExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageExperience::Years(value) => write_one_decimal(f, *value),
            AverageExperience::NotAvailable => f.write_str("N/A"),
        }
    }
}

// Exact halfway values (x.x5 with a binary-exact expansion, i.e. odd
// multiples of 0.25) round away from zero; everything else rounds to the
// nearest one-decimal value of the exact expansion.
fn write_one_decimal(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        let tenths = (value * 10.0).abs().ceil().copysign(value);
        return write!(f, "{:.1}", tenths / 10.0);
    }
    write!(f, "{value:.1}")
}

impl Serialize for AverageExperience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Counts and averages derived from whatever candidate set the client holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineAnalytics {
    pub stage_counts: Vec<StageTally>,
    pub role_counts: Vec<RoleTally>,
    pub average_experience: AverageExperience,
}

impl PipelineAnalytics {
    pub fn project(cards: &[CandidateCard]) -> Self {
        let stage_counts = tally(cards.iter().map(|card| card.current_stage.as_str()))
            .into_iter()
            .map(|(stage, count)| StageTally { stage, count })
            .collect();

        let role_counts = tally(cards.iter().map(|card| card.role.as_str()))
            .into_iter()
            .map(|(role, count)| RoleTally { role, count })
            .collect();

        Self {
            stage_counts,
            role_counts,
            average_experience: average_experience(cards),
        }
    }
}

// Entries keep first-appearance order.
fn tally<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<(String, usize)> = Vec::new();
    for value in values {
        match positions.get(value) {
            Some(&position) => entries[position].1 += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push((value.to_string(), 1));
            }
        }
    }
    entries
}

pub fn average_experience(cards: &[CandidateCard]) -> AverageExperience {
    let qualifying: Vec<f64> = cards
        .iter()
        .filter_map(|card| card.years_of_experience.as_ref()?.years())
        .filter(|years| *years >= 0.0)
        .collect();

    if qualifying.is_empty() {
        return AverageExperience::NotAvailable;
    }

    AverageExperience::Years(qualifying.iter().sum::<f64>() / qualifying.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{CandidateId, ExperienceField};

    fn card(id: &str, stage: &str, role: &str, years: Option<ExperienceField>) -> CandidateCard {
        CandidateCard {
            id: CandidateId(id.to_string()),
            name: id.to_string(),
            company: "Initech".to_string(),
            role: role.to_string(),
            current_stage: stage.to_string(),
            applied_date: None,
            years_of_experience: years,
            resume_link: None,
        }
    }

    #[test]
    fn average_skips_invalid_and_negative_values() {
        let cards = vec![
            card("a", "Applied", "Engineer", Some(ExperienceField::Number(2.0))),
            card("b", "Applied", "Engineer", Some(ExperienceField::Number(4.0))),
            card("c", "Applied", "Engineer", Some(ExperienceField::Text("bad".into()))),
            card("d", "Applied", "Engineer", Some(ExperienceField::Number(-1.0))),
        ];

        let average = average_experience(&cards);
        assert_eq!(average, AverageExperience::Years(3.0));
        assert_eq!(average.to_string(), "3.0");
    }

    #[test]
    fn average_is_not_available_without_qualifying_cards() {
        let cards = vec![
            card("a", "Applied", "Engineer", None),
            card("b", "Applied", "Engineer", Some(ExperienceField::Text(String::new()))),
        ];
        assert_eq!(average_experience(&cards), AverageExperience::NotAvailable);
        assert_eq!(average_experience(&[]).to_string(), "N/A");
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let cards = vec![
            card("a", "Applied", "Engineer", Some(ExperienceField::Number(1.0))),
            card("b", "Applied", "Engineer", Some(ExperienceField::Number(2.0))),
            card("c", "Applied", "Engineer", Some(ExperienceField::Text("2".into()))),
        ];
        assert_eq!(average_experience(&cards).to_string(), "1.7");
    }

    #[test]
    fn average_rounds_exact_halves_up() {
        let cards = vec![
            card("a", "Applied", "Engineer", Some(ExperienceField::Number(0.0))),
            card("b", "Applied", "Engineer", Some(ExperienceField::Number(0.5))),
        ];
        assert_eq!(average_experience(&cards), AverageExperience::Years(0.25));
        assert_eq!(average_experience(&cards).to_string(), "0.3");

        assert_eq!(AverageExperience::Years(1.25).to_string(), "1.3");
        assert_eq!(AverageExperience::Years(0.35).to_string(), "0.3");
        assert_eq!(AverageExperience::Years(2.5).to_string(), "2.5");
    }

    #[test]
    fn projection_tallies_present_values_in_first_seen_order() {
        let cards = vec![
            card("a", "Offer", "Engineer", None),
            card("b", "Applied", "Designer", None),
            card("c", "Offer", "Engineer", None),
            card("d", "Hired", "Engineer", None),
        ];

        let analytics = PipelineAnalytics::project(&cards);

        assert_eq!(
            analytics.stage_counts,
            vec![
                StageTally { stage: "Offer".into(), count: 2 },
                StageTally { stage: "Applied".into(), count: 1 },
                StageTally { stage: "Hired".into(), count: 1 },
            ]
        );
        assert_eq!(
            analytics.role_counts,
            vec![
                RoleTally { role: "Engineer".into(), count: 3 },
                RoleTally { role: "Designer".into(), count: 1 },
            ]
        );
        let total: usize = analytics.stage_counts.iter().map(|entry| entry.count).sum();
        assert_eq!(total, cards.len());
    }

    #[test]
    fn projection_serializes_average_as_display_text() {
        let analytics = PipelineAnalytics::project(&[]);
        let value = serde_json::to_value(&analytics).expect("serializes");
        assert_eq!(value["averageExperience"], serde_json::json!("N/A"));
        assert!(value["stageCounts"].as_array().expect("array").is_empty());
    }
}
