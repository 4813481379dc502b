//! Code selection, result assembly and the analysis entry point.

use serde::{Deserialize, Serialize};

use crate::scoring::{assess_mdm, MatchScope, MdmAssessment};
use crate::tables::CodingTables;
use crate::time::{resolve_time, TierSelection, TimeAssessment, TimeExtractor};
use crate::{CodingError, Level, Method, PatientType, PayerMode};

/// Behavior switches for the ambiguous parts of the coding rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub tier_selection: TierSelection,
    #[serde(default)]
    pub match_scope: MatchScope,
    /// Extracted minutes above this ceiling are rejected. `None` accepts any value.
    #[serde(default)]
    pub max_minutes: Option<u32>,
}

/// MDM and time severity side by side; present only when time was documented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comparison {
    pub mdm_value: u8,
    pub time_value: u8,
    pub winner: Method,
    pub tie: bool,
}

/// Add-on code and unit count for time past the base threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProlongedService {
    pub code: String,
    pub units: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub code: String,
    pub method: Method,
    pub level: Level,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    pub patient_type: PatientType,
    pub payer_mode: PayerMode,
    pub mdm: MdmAssessment,
    pub time: Option<TimeAssessment>,
    pub final_code: String,
    pub final_method: Method,
    pub final_level: Level,
    /// Advisory; never changes the final code.
    pub below_documentation_minimum: bool,
    pub comparison: Option<Comparison>,
    pub prolonged_service: Option<ProlongedService>,
}

/// Time replaces MDM only when it shows strictly higher complexity.
pub fn select_code(mdm: &MdmAssessment, time: Option<&TimeAssessment>) -> Selection {
    match time {
        Some(time) if time.severity_value > mdm.combined_score => Selection {
            code: time.code.clone(),
            method: Method::Time,
            level: time.level,
        },
        _ => Selection {
            code: mdm.code.clone(),
            method: Method::Mdm,
            level: mdm.combined_level,
        },
    }
}

/// Package the intermediate results into the final record.
pub fn assemble(
    patient: PatientType,
    payer: PayerMode,
    mdm: MdmAssessment,
    time: Option<TimeAssessment>,
    tables: &CodingTables,
) -> AnalysisResult {
    let selection = select_code(&mdm, time.as_ref());

    let below_documentation_minimum = time
        .as_ref()
        .is_some_and(|t| t.minutes < *tables.documentation_minimum.get(patient));

    let comparison = time.as_ref().map(|t| Comparison {
        mdm_value: mdm.combined_score,
        time_value: t.severity_value,
        winner: selection.method,
        tie: mdm.combined_score == t.severity_value,
    });

    let prolonged_service = time
        .as_ref()
        .filter(|t| t.prolonged_units > 0)
        .map(|t| ProlongedService {
            code: tables.prolonged_codes.get(payer).clone(),
            units: t.prolonged_units,
        });

    AnalysisResult {
        patient_type: patient,
        payer_mode: payer,
        mdm,
        time,
        final_code: selection.code,
        final_method: selection.method,
        final_level: selection.level,
        below_documentation_minimum,
        comparison,
        prolonged_service,
    }
}

/// Validated tables, compiled time matchers and behavior switches.
#[derive(Debug, Clone)]
pub struct Analyzer {
    tables: CodingTables,
    extractor: TimeExtractor,
    config: EngineConfig,
}

impl Analyzer {
    pub fn new(tables: CodingTables, config: EngineConfig) -> Result<Self, CodingError> {
        tables.validate()?;
        let extractor = TimeExtractor::from_patterns(&tables.time_patterns)?;
        Ok(Self {
            tables,
            extractor,
            config,
        })
    }

    /// Standard tables with the default configuration.
    pub fn standard() -> Result<Self, CodingError> {
        Self::new(CodingTables::standard(), EngineConfig::default())
    }

    pub fn tables(&self) -> &CodingTables {
        &self.tables
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &TimeExtractor {
        &self.extractor
    }

    /// Classify one note.
    pub fn analyze(
        &self,
        note: &str,
        patient: PatientType,
        payer: PayerMode,
    ) -> Result<AnalysisResult, CodingError> {
        if note.trim().is_empty() {
            return Err(CodingError::EmptyNote);
        }

        let mdm = assess_mdm(note, patient, &self.tables, self.config.match_scope);

        // Zero minutes counts as undocumented.
        let minutes = self.extractor.extract(note).filter(|m| *m > 0);
        if let (Some(minutes), Some(ceiling)) = (minutes, self.config.max_minutes) {
            if minutes > ceiling {
                tracing::warn!(minutes, ceiling, "documented time above ceiling");
                return Err(CodingError::ImplausibleTime { minutes, ceiling });
            }
        }

        let time = minutes.map(|minutes| {
            resolve_time(
                minutes,
                patient,
                payer,
                &self.tables,
                self.config.tier_selection,
            )
        });

        let result = assemble(patient, payer, mdm, time, &self.tables);
        tracing::info!(
            code = %result.final_code,
            method = %result.final_method,
            level = %result.final_level,
            "note analyzed"
        );
        Ok(result)
    }
}

/// Analyze with the standard tables and default configuration.
pub fn analyze(
    note: &str,
    patient: PatientType,
    payer: PayerMode,
) -> Result<AnalysisResult, CodingError> {
    Analyzer::standard()?.analyze(note, patient, payer)
}
