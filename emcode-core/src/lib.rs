//! Core logic for classifying an encounter note into an outpatient E/M code.
//!
//! The engine is a pure function of the note, the patient type, the payer mode
//! and the static [`CodingTables`]. It scores three MDM axes by keyword, takes
//! the median, extracts documented time, and keeps whichever pathway shows the
//! higher complexity.

mod engine;
mod scoring;
mod tables;
mod time;
mod types;

pub use engine::{
    analyze, assemble, select_code, AnalysisResult, Analyzer, Comparison, EngineConfig,
    ProlongedService, Selection,
};
pub use scoring::{
    assess_mdm, combine_axes, score_axis, AxisAssessment, MatchScope, MdmAssessment,
};
pub use tables::{
    AxisCriteria, ByPatient, ByPayer, CodingTables, CriteriaTable, LevelCodes, TimePattern,
    TimeThresholdRow,
};
pub use time::{resolve_time, TierSelection, TimeAssessment, TimeExtractor, TimeMatcher};
pub use types::{Axis, Level, Method, PatientType, PayerMode};

/// Errors raised at the engine boundary or while preparing tables.
#[derive(Debug, thiserror::Error)]
pub enum CodingError {
    #[error("Clinical note is empty")]
    EmptyNote,
    #[error("Documented time of {minutes} minutes exceeds the {ceiling} minute ceiling")]
    ImplausibleTime { minutes: u32, ceiling: u32 },
    #[error("Invalid coding tables: {0}")]
    InvalidTables(String),
    #[error("Invalid time pattern: {0}")]
    Pattern(String),
    #[error("Could not read coding tables: {0}")]
    Parse(String),
}
