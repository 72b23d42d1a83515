use serde::{Deserialize, Serialize};

use super::config::Strictness;
use super::rules;

/// First rule that rejected a posting. Order mirrors evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisqualifyReason {
    GraduateDegreeInTitle,
    YearsOfExperience,
    GraduateDegreeRequired,
    ResearchRole,
    LeadershipRole,
}

impl DisqualifyReason {
    pub fn summary(&self) -> String {
        match self {
            DisqualifyReason::GraduateDegreeInTitle => {
                "title asks for a graduate degree".to_string()
            }
            DisqualifyReason::YearsOfExperience => {
                "qualifications require years of experience".to_string()
            }
            DisqualifyReason::GraduateDegreeRequired => {
                "qualifications require a graduate degree".to_string()
            }
            DisqualifyReason::ResearchRole => "title is a research role".to_string(),
            DisqualifyReason::LeadershipRole => {
                "title implies a senior, lead or management role".to_string()
            }
        }
    }
}

/// Inputs to the rule chain, already normalized by the engine.
pub(crate) struct ScreeningInput<'a> {
    pub title: &'a str,
    /// Lowercased, newline-joined qualification text; `None` when the record has none.
    pub qualifications: Option<&'a str>,
    /// Policy applied to degree mentions in `qualifications`.
    pub degree_policy: Strictness,
    /// Policy requested by the caller; gates title-only strict rules.
    pub requested: Strictness,
}

pub(crate) fn first_disqualification(input: &ScreeningInput<'_>) -> Option<DisqualifyReason> {
    if rules::title_mentions_graduate_degree(input.title) {
        return Some(DisqualifyReason::GraduateDegreeInTitle);
    }

    if let Some(text) = input.qualifications {
        if rules::mentions_years_of_experience(text) {
            return Some(DisqualifyReason::YearsOfExperience);
        }

        if rules::mentions_graduate_degree(text) {
            let excused = match input.degree_policy {
                Strictness::Strict => false,
                Strictness::Lenient => rules::mentions_bachelor_degree(text),
            };
            if !excused {
                return Some(DisqualifyReason::GraduateDegreeRequired);
            }
        }
    }

    if input.requested.is_strict() && rules::title_is_research_role(input.title) {
        return Some(DisqualifyReason::ResearchRole);
    }

    if rules::title_is_leadership_role(input.title) {
        return Some(DisqualifyReason::LeadershipRole);
    }

    None
}
