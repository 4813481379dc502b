//! Static coding tables: keyword criteria, time tiers, code maps and thresholds.
//!
//! Tables are plain data. They are built once (from [`CodingTables::standard`] or a
//! JSON document loaded by `emcode-tables`), validated, and never mutated by the engine.

use serde::{Deserialize, Serialize};

use crate::{Axis, CodingError, Level, PatientType, PayerMode};

/// Value that differs by patient type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ByPatient<T> {
    pub new: T,
    pub established: T,
}

impl<T> ByPatient<T> {
    pub fn get(&self, patient: PatientType) -> &T {
        match patient {
            PatientType::New => &self.new,
            PatientType::Established => &self.established,
        }
    }
}

/// Value that differs by payer mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ByPayer<T> {
    pub commercial: T,
    pub medicare: T,
}

impl<T> ByPayer<T> {
    pub fn get(&self, payer: PayerMode) -> &T {
        match payer {
            PayerMode::Commercial => &self.commercial,
            PayerMode::Medicare => &self.medicare,
        }
    }
}

/// Indicator phrases of one axis, one list per level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AxisCriteria {
    #[serde(default)]
    pub straightforward: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub high: Vec<String>,
}

impl AxisCriteria {
    pub fn phrases(&self, level: Level) -> &[String] {
        match level {
            Level::Straightforward => &self.straightforward,
            Level::Low => &self.low,
            Level::Moderate => &self.moderate,
            Level::High => &self.high,
        }
    }

    /// Levels with their phrases, in ascending severity.
    pub fn levels(&self) -> impl Iterator<Item = (Level, &[String])> + '_ {
        Level::ALL
            .into_iter()
            .map(move |level| (level, self.phrases(level)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CriteriaTable {
    #[serde(default)]
    pub problems: AxisCriteria,
    #[serde(default)]
    pub data: AxisCriteria,
    #[serde(default)]
    pub risk: AxisCriteria,
}

impl CriteriaTable {
    pub fn axis(&self, axis: Axis) -> &AxisCriteria {
        match axis {
            Axis::Problems => &self.problems,
            Axis::Data => &self.data,
            Axis::Risk => &self.risk,
        }
    }
}

/// One time tier for a patient type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeThresholdRow {
    pub code: String,
    pub level: Level,
    pub min_minutes: u32,
    pub severity_value: u8,
}

/// E/M code per MDM level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelCodes {
    pub straightforward: String,
    pub low: String,
    pub moderate: String,
    pub high: String,
}

impl LevelCodes {
    pub fn code(&self, level: Level) -> &str {
        match level {
            Level::Straightforward => &self.straightforward,
            Level::Low => &self.low,
            Level::Moderate => &self.moderate,
            Level::High => &self.high,
        }
    }
}

/// A prioritized time matcher in source form: a regular expression and the
/// capture group holding the minute count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimePattern {
    pub pattern: String,
    #[serde(default = "default_group")]
    pub group: usize,
}

fn default_group() -> usize {
    1
}

/// Every table the engine reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodingTables {
    pub version: String,
    pub criteria: CriteriaTable,
    /// Four rows per patient type, ascending by `min_minutes`.
    pub time_thresholds: ByPatient<[TimeThresholdRow; 4]>,
    /// Upper bound of the highest tier's normal range; minutes beyond it
    /// accrue prolonged-service units.
    pub base_minutes: ByPayer<ByPatient<u32>>,
    pub mdm_codes: ByPatient<LevelCodes>,
    pub prolonged_codes: ByPayer<String>,
    pub documentation_minimum: ByPatient<u32>,
    pub prolonged_unit_minutes: u32,
    pub time_patterns: Vec<TimePattern>,
}

impl Default for CodingTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl CodingTables {
    /// Office/outpatient tables for the 2025 guideline year.
    pub fn standard() -> Self {
        Self {
            version: "2025".to_string(),
            criteria: CriteriaTable {
                problems: AxisCriteria {
                    straightforward: phrases(&["self-limited", "minor problem"]),
                    low: phrases(&["stable chronic", "acute uncomplicated"]),
                    moderate: phrases(&[
                        "multiple chronic",
                        "exacerbation",
                        "progression",
                        "undiagnosed new problem",
                        "uncertain prognosis",
                    ]),
                    high: phrases(&["severe exacerbation", "threat to life", "life-threatening"]),
                },
                data: AxisCriteria {
                    straightforward: Vec::new(),
                    low: phrases(&["review external note", "review test result"]),
                    moderate: phrases(&[
                        "multiple unique tests",
                        "independent interpretation",
                        "discussion with",
                        "consult",
                    ]),
                    high: phrases(&["extensive data", "multiple sources"]),
                },
                risk: AxisCriteria {
                    straightforward: phrases(&["otc", "reassurance"]),
                    low: phrases(&["minor procedure"]),
                    moderate: phrases(&["prescription drug management", "minor surgery"]),
                    high: phrases(&["hospitalization", "emergency surgery"]),
                },
            },
            time_thresholds: ByPatient {
                new: [
                    row("99202", Level::Straightforward, 15),
                    row("99203", Level::Low, 30),
                    row("99204", Level::Moderate, 45),
                    row("99205", Level::High, 60),
                ],
                established: [
                    row("99212", Level::Straightforward, 10),
                    row("99213", Level::Low, 20),
                    row("99214", Level::Moderate, 30),
                    row("99215", Level::High, 40),
                ],
            },
            base_minutes: ByPayer {
                commercial: ByPatient {
                    new: 74,
                    established: 54,
                },
                medicare: ByPatient {
                    new: 88,
                    established: 68,
                },
            },
            mdm_codes: ByPatient {
                new: level_codes(["99202", "99203", "99204", "99205"]),
                established: level_codes(["99212", "99213", "99214", "99215"]),
            },
            prolonged_codes: ByPayer {
                commercial: "99417".to_string(),
                medicare: "G2212".to_string(),
            },
            documentation_minimum: ByPatient {
                new: 15,
                established: 10,
            },
            prolonged_unit_minutes: 15,
            time_patterns: vec![
                TimePattern {
                    pattern: r"(?i)total\s*time[^0-9]*([0-9]+)".to_string(),
                    group: 1,
                },
                TimePattern {
                    pattern: r"(?i)time\s*spent[^0-9]*([0-9]+)".to_string(),
                    group: 1,
                },
            ],
        }
    }

    /// Check the structural invariants the engine relies on.
    pub fn validate(&self) -> Result<(), CodingError> {
        for patient in [PatientType::New, PatientType::Established] {
            let rows = self.time_thresholds.get(patient);
            for (row, expected) in rows.iter().zip(Level::ALL) {
                if row.level != expected {
                    return Err(CodingError::InvalidTables(format!(
                        "{patient} time row {} has level {}, expected {expected}",
                        row.code, row.level
                    )));
                }
                if row.severity_value != row.level.score() {
                    return Err(CodingError::InvalidTables(format!(
                        "{patient} time row {} has severity {} but level {} scores {}",
                        row.code,
                        row.severity_value,
                        row.level,
                        row.level.score()
                    )));
                }
                if row.code.trim().is_empty() {
                    return Err(CodingError::InvalidTables(format!(
                        "{patient} time row for {} has an empty code",
                        row.level
                    )));
                }
            }
            if rows
                .windows(2)
                .any(|pair| pair[0].min_minutes > pair[1].min_minutes)
            {
                return Err(CodingError::InvalidTables(format!(
                    "{patient} time rows are not ascending by minimum minutes"
                )));
            }

            let codes = self.mdm_codes.get(patient);
            if let Some(level) = Level::ALL
                .into_iter()
                .find(|level| codes.code(*level).trim().is_empty())
            {
                return Err(CodingError::InvalidTables(format!(
                    "{patient} MDM code for {level} is empty"
                )));
            }
        }

        if self.prolonged_unit_minutes == 0 {
            return Err(CodingError::InvalidTables(
                "prolonged_unit_minutes must be positive".to_string(),
            ));
        }
        if self.time_patterns.is_empty() {
            return Err(CodingError::InvalidTables(
                "at least one time pattern is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn row(code: &str, level: Level, min_minutes: u32) -> TimeThresholdRow {
    TimeThresholdRow {
        code: code.to_string(),
        level,
        min_minutes,
        severity_value: level.score(),
    }
}

fn level_codes([straightforward, low, moderate, high]: [&str; 4]) -> LevelCodes {
    LevelCodes {
        straightforward: straightforward.to_string(),
        low: low.to_string(),
        moderate: moderate.to_string(),
        high: high.to_string(),
    }
}
