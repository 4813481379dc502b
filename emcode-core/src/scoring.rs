//! Keyword scoring per axis and the median-of-three MDM rule.

use serde::{Deserialize, Serialize};

use crate::tables::{AxisCriteria, CodingTables};
use crate::{Axis, Level, PatientType};

/// Which matched phrases an axis assessment reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// Only the phrases of the adopted level; lower-level matches are dropped.
    #[default]
    AdoptedLevel,
    /// Phrases of every matched level up to the adopted one, in level order.
    AllLevels,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AxisAssessment {
    pub axis: Axis,
    pub level: Level,
    pub score: u8,
    pub matched_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MdmAssessment {
    pub problems: AxisAssessment,
    pub data: AxisAssessment,
    pub risk: AxisAssessment,
    pub combined_level: Level,
    /// Median of the three axis scores.
    pub combined_score: u8,
    pub code: String,
}

impl MdmAssessment {
    pub fn axis(&self, axis: Axis) -> &AxisAssessment {
        match axis {
            Axis::Problems => &self.problems,
            Axis::Data => &self.data,
            Axis::Risk => &self.risk,
        }
    }
}

/// Score one axis: the most severe level with at least one indicator phrase
/// literally present in the note (case-insensitive).
pub fn score_axis(
    text: &str,
    axis: Axis,
    criteria: &AxisCriteria,
    scope: MatchScope,
) -> AxisAssessment {
    let normalized = text.to_lowercase();
    let mut best = Level::Straightforward;
    let mut matched: Vec<String> = Vec::new();

    for (level, phrases) in criteria.levels() {
        let found: Vec<String> = phrases
            .iter()
            .filter(|phrase| normalized.contains(&phrase.to_lowercase()))
            .cloned()
            .collect();

        if found.is_empty() {
            continue;
        }

        if level.score() > best.score() {
            best = level;
            match scope {
                MatchScope::AdoptedLevel => matched = found,
                MatchScope::AllLevels => matched.extend(found),
            }
        } else if scope == MatchScope::AllLevels {
            // Straightforward matches never displace the initial level.
            matched.extend(found);
        }
    }

    AxisAssessment {
        axis,
        level: best,
        score: best.score(),
        matched_phrases: matched,
    }
}

/// The "2 of 3" rule: overall complexity is the middle-ranked axis score.
pub fn combine_axes(
    problems: &AxisAssessment,
    data: &AxisAssessment,
    risk: &AxisAssessment,
) -> (Level, u8) {
    let mut scores = [problems.score, data.score, risk.score];
    scores.sort_unstable_by(|a, b| b.cmp(a));
    let median = scores[1];
    // Axis scores always come from a Level, so the median maps back to one.
    let level = Level::from_score(median).unwrap_or_default();
    (level, median)
}

/// Score all three axes and derive the MDM code for the patient type.
pub fn assess_mdm(
    text: &str,
    patient: PatientType,
    tables: &CodingTables,
    scope: MatchScope,
) -> MdmAssessment {
    let [problems, data, risk] = Axis::ALL.map(|axis| {
        let assessment = score_axis(text, axis, tables.criteria.axis(axis), scope);
        tracing::debug!(
            axis = axis.label(),
            level = %assessment.level,
            matches = assessment.matched_phrases.len(),
            "axis scored"
        );
        assessment
    });

    let (combined_level, combined_score) = combine_axes(&problems, &data, &risk);
    let code = tables.mdm_codes.get(patient).code(combined_level).to_string();

    MdmAssessment {
        problems,
        data,
        risk,
        combined_level,
        combined_score,
        code,
    }
}
