//! Documented-time extraction and the time-tier lookup.

use std::num::IntErrorKind;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tables::{CodingTables, TimePattern, TimeThresholdRow};
use crate::{CodingError, Level, PatientType, PayerMode};

/// How the time tier is picked from the ascending threshold rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierSelection {
    /// First row whose minimum is met, scanning ascending. Returns the lowest
    /// tier for any minute count at or above the lowest minimum.
    #[default]
    FirstQualifying,
    /// Highest row whose minimum is met.
    HighestQualifying,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeAssessment {
    pub minutes: u32,
    pub level: Level,
    pub code: String,
    pub severity_value: u8,
    pub prolonged_units: u32,
}

/// One compiled matcher: the minute count sits in capture group `group`.
#[derive(Debug, Clone)]
pub struct TimeMatcher {
    pattern: Regex,
    group: usize,
}

impl TimeMatcher {
    pub fn new(pattern: &str, group: usize) -> Result<Self, CodingError> {
        let pattern = Regex::new(pattern)
            .map_err(|err| CodingError::Pattern(format!("{pattern}: {err}")))?;
        if group >= pattern.captures_len() {
            return Err(CodingError::Pattern(format!(
                "{} has no capture group {group}",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern, group })
    }

    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
    }
}

/// Prioritized list of matchers. New phrasings are added as data, the scan
/// itself never changes.
#[derive(Debug, Clone)]
pub struct TimeExtractor {
    matchers: Vec<TimeMatcher>,
}

impl TimeExtractor {
    pub fn from_patterns(patterns: &[TimePattern]) -> Result<Self, CodingError> {
        let matchers = patterns
            .iter()
            .map(|p| TimeMatcher::new(&p.pattern, p.group))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    pub fn matchers(&self) -> &[TimeMatcher] {
        &self.matchers
    }

    /// Minutes captured by the first matcher that matches anywhere in the
    /// note. Later matchers are never consulted once one matches; a capture
    /// too large for `u32` saturates to `u32::MAX`, any other unparseable
    /// capture yields `None`.
    pub fn extract(&self, text: &str) -> Option<u32> {
        let (matcher, raw) = self
            .matchers
            .iter()
            .find_map(|matcher| matcher.capture(text).map(|raw| (matcher, raw)))?;

        match raw.trim().parse::<u32>() {
            Ok(minutes) => Some(minutes),
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => {
                tracing::warn!(
                    pattern = matcher.pattern.as_str(),
                    value = raw,
                    "saturating oversized time value"
                );
                Some(u32::MAX)
            }
            Err(err) => {
                tracing::warn!(
                    pattern = matcher.pattern.as_str(),
                    value = raw,
                    "ignoring unparseable time value: {err}"
                );
                None
            }
        }
    }
}

/// Map documented minutes to a time tier, forcing the highest tier and
/// counting prolonged units once the payer's base threshold is exceeded.
pub fn resolve_time(
    minutes: u32,
    patient: PatientType,
    payer: PayerMode,
    tables: &CodingTables,
    selection: TierSelection,
) -> TimeAssessment {
    let rows = tables.time_thresholds.get(patient);
    let qualifies = |row: &&TimeThresholdRow| minutes >= row.min_minutes;

    let mut selected = match selection {
        TierSelection::FirstQualifying => rows.iter().find(qualifies),
        TierSelection::HighestQualifying => rows.iter().rev().find(qualifies),
    }
    .unwrap_or(&rows[0]);

    let base = *tables.base_minutes.get(payer).get(patient);
    let mut prolonged_units = 0;
    if minutes > base {
        let excess = minutes - base;
        let unit = tables.prolonged_unit_minutes.max(1);
        prolonged_units = excess.div_ceil(unit);
        selected = &rows[rows.len() - 1];
    }

    tracing::debug!(
        minutes,
        base,
        code = %selected.code,
        prolonged_units,
        ?selection,
        "time resolved"
    );

    TimeAssessment {
        minutes,
        level: selected.level,
        code: selected.code.clone(),
        severity_value: selected.severity_value,
        prolonged_units,
    }
}
