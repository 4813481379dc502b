//! Enumerations shared by every stage of the analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three independent MDM dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Problems,
    Data,
    Risk,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Problems, Axis::Data, Axis::Risk];

    pub fn label(self) -> &'static str {
        match self {
            Axis::Problems => "Problems",
            Axis::Data => "Data",
            Axis::Risk => "Risk",
        }
    }
}

/// Severity tier. The attached score is the only value compared across axes
/// and across the MDM/time pathways.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Straightforward,
    Low,
    Moderate,
    High,
}

impl Level {
    /// Iteration order used by the axis scorer. Must stay ascending.
    pub const ALL: [Level; 4] = [Level::Straightforward, Level::Low, Level::Moderate, Level::High];

    pub fn score(self) -> u8 {
        match self {
            Level::Straightforward => 0,
            Level::Low => 1,
            Level::Moderate => 2,
            Level::High => 3,
        }
    }

    pub fn from_score(score: u8) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.score() == score)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Straightforward => "Straightforward",
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    New,
    #[default]
    Established,
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatientType::New => "New",
            PatientType::Established => "Established",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayerMode {
    #[default]
    Commercial,
    Medicare,
}

impl fmt::Display for PayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayerMode::Commercial => "Commercial",
            PayerMode::Medicare => "Medicare",
        })
    }
}

/// Pathway that produced the final code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Mdm,
    Time,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Mdm => "MDM",
            Method::Time => "TIME",
        })
    }
}
