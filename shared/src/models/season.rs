//! Indian cropping seasons

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three-season cropping taxonomy used by the historical dataset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Monsoon season, sown June-July
    Kharif,
    /// Winter season, sown October-November
    Rabi,
    /// Short summer season between rabi and kharif
    Zaid,
}

impl Season {
    /// Map free-text season labels onto the taxonomy.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognised labels yield `None`.
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "kharif" | "autumn" | "whole year" => Some(Season::Kharif),
            "rabi" | "winter" => Some(Season::Rabi),
            "zaid" | "summer" => Some(Season::Zaid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "kharif",
            Season::Rabi => "rabi",
            Season::Zaid => "zaid",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
