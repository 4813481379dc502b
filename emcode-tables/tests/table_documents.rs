use std::fs;

use emcode_core::{
    Analyzer, CodingError, CodingTables, EngineConfig, Level, PatientType, PayerMode,
    TierSelection,
};
use emcode_tables::{load_tables_str, load_tables_value, tables_to_json};
use serde_json::{json, Value};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn standard_tables_match_golden() {
    let actual: Value = serde_json::from_str(
        &tables_to_json(&CodingTables::standard()).expect("Could not dump tables"),
    )
    .expect("Dump is not valid JSON");

    let expected = fs::read_to_string(fixture_path("standard_tables.json"))
        .expect("Could not read golden tables");
    let expected: Value = serde_json::from_str(&expected).expect("Golden is not valid JSON");

    assert_eq!(actual, expected);
}

#[test]
fn golden_document_loads_as_standard_tables() {
    let document = fs::read_to_string(fixture_path("standard_tables.json"))
        .expect("Could not read golden tables");
    let tables = load_tables_str(&document).expect("Could not load tables");
    assert_eq!(tables, CodingTables::standard());
}

#[test]
fn overlay_replaces_only_given_sections() {
    let document = fs::read_to_string(fixture_path("telehealth_overlay.json"))
        .expect("Could not read overlay");
    let tables = load_tables_str(&document).expect("Could not load tables");
    let standard = CodingTables::standard();

    assert_eq!(tables.version, "2025-telehealth");
    assert!(tables
        .criteria
        .problems
        .low
        .contains(&"well-controlled".to_string()));
    assert!(tables.criteria.problems.straightforward.is_empty());
    assert_eq!(tables.time_thresholds, standard.time_thresholds);
    assert_eq!(tables.base_minutes, standard.base_minutes);
    assert_eq!(tables.prolonged_codes, standard.prolonged_codes);
    assert_eq!(tables.time_patterns.len(), standard.time_patterns.len() + 1);
    assert_eq!(tables.time_patterns[2].group, 1);
}

#[test]
fn overlay_tables_drive_the_analysis() {
    let document = fs::read_to_string(fixture_path("telehealth_overlay.json"))
        .expect("Could not read overlay");
    let tables = load_tables_str(&document).expect("Could not load tables");
    let analyzer = Analyzer::new(
        tables,
        EngineConfig {
            tier_selection: TierSelection::HighestQualifying,
            ..EngineConfig::default()
        },
    )
    .expect("Tables are valid");

    let result = analyzer
        .analyze(
            "Well-controlled asthma. Virtual visit 32 minutes.",
            PatientType::Established,
            PayerMode::Commercial,
        )
        .expect("Analysis failed");

    assert_eq!(result.mdm.problems.level, Level::Low);
    assert_eq!(result.time.as_ref().map(|t| t.minutes), Some(32));
    assert_eq!(result.final_code, "99214");
}

#[test]
fn wrong_kind_is_rejected() {
    let err = load_tables_value(&json!({ "kind": "fhir-bundle" })).unwrap_err();
    assert!(matches!(&err, CodingError::Parse(msg) if msg.contains("fhir-bundle")));

    let err = load_tables_value(&json!({ "version": "x" })).unwrap_err();
    assert!(matches!(&err, CodingError::Parse(msg) if msg.contains("kind")));
}

#[test]
fn unknown_sections_are_rejected() {
    let err = load_tables_value(&json!({
        "kind": "em-coding-tables",
        "modifiers": ["25"]
    }))
    .unwrap_err();
    assert!(matches!(err, CodingError::Parse(_)));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = load_tables_str("{ not json").unwrap_err();
    assert!(matches!(err, CodingError::Parse(_)));
}

#[test]
fn merged_tables_are_validated() {
    let err = load_tables_value(&json!({
        "kind": "em-coding-tables",
        "prolonged_unit_minutes": 0
    }))
    .unwrap_err();
    assert!(matches!(err, CodingError::InvalidTables(_)));

    let err = load_tables_value(&json!({
        "kind": "em-coding-tables",
        "time_thresholds": {
            "new": [
                { "code": "99202", "level": "straightforward", "min_minutes": 15, "severity_value": 0 },
                { "code": "99203", "level": "low", "min_minutes": 30, "severity_value": 1 },
                { "code": "99204", "level": "moderate", "min_minutes": 45, "severity_value": 2 },
                { "code": "99205", "level": "high", "min_minutes": 60, "severity_value": 3 }
            ],
            "established": [
                { "code": "99212", "level": "straightforward", "min_minutes": 10, "severity_value": 0 },
                { "code": "99213", "level": "low", "min_minutes": 20, "severity_value": 1 },
                { "code": "99214", "level": "moderate", "min_minutes": 30, "severity_value": 3 },
                { "code": "99215", "level": "high", "min_minutes": 40, "severity_value": 3 }
            ]
        }
    }))
    .unwrap_err();
    assert!(matches!(err, CodingError::InvalidTables(_)));
}

#[test]
fn time_tables_need_exactly_four_rows() {
    let err = load_tables_value(&json!({
        "kind": "em-coding-tables",
        "time_thresholds": {
            "new": [
                { "code": "99202", "level": "straightforward", "min_minutes": 15, "severity_value": 0 }
            ],
            "established": []
        }
    }))
    .unwrap_err();
    assert!(matches!(err, CodingError::Parse(_)));
}
