//! JSON coding-table documents layered over the standard tables.
//!
//! A document names its kind and version and may carry any subset of the
//! table sections. Missing sections keep their standard values; the merged
//! tables are validated before they are returned.

use emcode_core::{
    ByPatient, ByPayer, CodingError, CodingTables, CriteriaTable, LevelCodes, TimePattern,
    TimeThresholdRow,
};
use serde::Deserialize;
use serde_json::Value;

/// Value of the `kind` field every table document must carry.
pub const DOCUMENT_KIND: &str = "em-coding-tables";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    kind: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    criteria: Option<CriteriaTable>,
    #[serde(default)]
    time_thresholds: Option<ByPatient<[TimeThresholdRow; 4]>>,
    #[serde(default)]
    base_minutes: Option<ByPayer<ByPatient<u32>>>,
    #[serde(default)]
    mdm_codes: Option<ByPatient<LevelCodes>>,
    #[serde(default)]
    prolonged_codes: Option<ByPayer<String>>,
    #[serde(default)]
    documentation_minimum: Option<ByPatient<u32>>,
    #[serde(default)]
    prolonged_unit_minutes: Option<u32>,
    #[serde(default)]
    time_patterns: Option<Vec<TimePattern>>,
    /// Appended after the active patterns instead of replacing them.
    #[serde(default)]
    extra_time_patterns: Vec<TimePattern>,
}

impl TableDocument {
    fn overlay(self, mut base: CodingTables) -> CodingTables {
        if let Some(version) = self.version {
            base.version = version;
        }
        if let Some(criteria) = self.criteria {
            base.criteria = criteria;
        }
        if let Some(rows) = self.time_thresholds {
            base.time_thresholds = rows;
        }
        if let Some(minutes) = self.base_minutes {
            base.base_minutes = minutes;
        }
        if let Some(codes) = self.mdm_codes {
            base.mdm_codes = codes;
        }
        if let Some(codes) = self.prolonged_codes {
            base.prolonged_codes = codes;
        }
        if let Some(minimum) = self.documentation_minimum {
            base.documentation_minimum = minimum;
        }
        if let Some(unit) = self.prolonged_unit_minutes {
            base.prolonged_unit_minutes = unit;
        }
        if let Some(patterns) = self.time_patterns {
            base.time_patterns = patterns;
        }
        base.time_patterns.extend(self.extra_time_patterns);
        base
    }
}

/// Load tables from a JSON string.
pub fn load_tables_str(document_json: &str) -> Result<CodingTables, CodingError> {
    let value: Value =
        serde_json::from_str(document_json).map_err(|err| CodingError::Parse(err.to_string()))?;
    load_tables_value(&value)
}

/// Load tables from a `serde_json::Value`.
pub fn load_tables_value(document: &Value) -> Result<CodingTables, CodingError> {
    let parsed = TableDocument::deserialize(document)
        .map_err(|err| CodingError::Parse(err.to_string()))?;

    if parsed.kind != DOCUMENT_KIND {
        return Err(CodingError::Parse(format!(
            "Expected kind {DOCUMENT_KIND}, received {}",
            parsed.kind
        )));
    }
    let tables = parsed.overlay(CodingTables::standard());
    tables.validate()?;

    tracing::debug!(version = %tables.version, "coding tables loaded");
    Ok(tables)
}

/// Serialize tables as a complete document, suitable for editing and reloading.
pub fn tables_to_json(tables: &CodingTables) -> Result<String, CodingError> {
    let mut value =
        serde_json::to_value(tables).map_err(|err| CodingError::Parse(err.to_string()))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("kind".to_string(), Value::String(DOCUMENT_KIND.to_string()));
    }
    serde_json::to_string_pretty(&value).map_err(|err| CodingError::Parse(err.to_string()))
}
