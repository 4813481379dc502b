//! Plain-text export of an analysis, the layout a coder files with the note.

use chrono::{DateTime, NaiveDate, TimeZone};
use emcode_core::{AnalysisResult, AxisAssessment};

/// Characters of the trimmed note kept in the preview.
pub const NOTE_PREVIEW_CHARS: usize = 500;

const RULE: &str = "----------------------------------------";

/// Render the export text for `result`.
pub fn render_text_report<Tz>(
    result: &AnalysisResult,
    note: &str,
    generated_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let recommended = match &result.prolonged_service {
        Some(prolonged) => format!(
            "{} + {} x {}",
            result.final_code, prolonged.code, prolonged.units
        ),
        None => result.final_code.clone(),
    };

    let documented = match &result.time {
        Some(time) => format!("{} minutes -> {}", time.minutes, time.code),
        None => "None".to_string(),
    };

    let mut lines = vec![
        format!("E/M Code Analysis - {}", generated_at.format("%m/%d/%Y")),
        RULE.to_string(),
        format!("Patient Type : {}", result.patient_type),
        format!("Payer        : {}", result.payer_mode),
        String::new(),
        format!("RECOMMENDED CODE: {recommended}"),
        format!("Method       : {}", result.final_method),
        format!("Level        : {}", result.final_level),
        String::new(),
        "MDM Breakdown".to_string(),
        format!("  Problems : {}", axis_line(&result.mdm.problems)),
        format!("  Data     : {}", axis_line(&result.mdm.data)),
        format!("  Risk     : {}", axis_line(&result.mdm.risk)),
        String::new(),
        format!("Time Documented: {documented}"),
    ];

    if result.below_documentation_minimum {
        lines.push(
            "Warning: documented time is below the minimum for this patient type".to_string(),
        );
    }

    lines.extend([
        String::new(),
        "Note Preview:".to_string(),
        note_preview(note),
        String::new(),
        RULE.to_string(),
        "Generated by E/M Code Analyzer • 2025 Guidelines • Educational use only".to_string(),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// File name for an export produced on `date`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("EM-Analysis-{}.txt", date.format("%Y-%m-%d"))
}

/// First characters of the trimmed note, with an ellipsis when the note is longer.
pub fn note_preview(note: &str) -> String {
    let mut preview: String = note.trim().chars().take(NOTE_PREVIEW_CHARS).collect();
    if note.chars().count() > NOTE_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

fn axis_line(assessment: &AxisAssessment) -> String {
    let matches = if assessment.matched_phrases.is_empty() {
        "none".to_string()
    } else {
        assessment.matched_phrases.join(", ")
    };
    format!("{} - {matches}", assessment.level.to_string().to_lowercase())
}
