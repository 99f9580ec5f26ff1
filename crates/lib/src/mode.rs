//! Response modes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::constants::{ACADEMIC_TOP_K, CLINICAL_TOP_K};

/// Framing of an answer: textbook depth or bedside practicality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Academic,
    Clinical,
}

impl Mode {
    /// Number of passages to request from the knowledge service.
    ///
    /// Academic answers synthesize broader evidence; clinical answers keep a
    /// smaller, decision-relevant set.
    pub fn top_k(self) -> usize {
        match self {
            Mode::Academic => ACADEMIC_TOP_K,
            Mode::Clinical => CLINICAL_TOP_K,
        }
    }

    /// Capitalized name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Academic => "Academic",
            Mode::Clinical => "Clinical",
        }
    }

    /// Wire name used in requests.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Academic => "academic",
            Mode::Clinical => "clinical",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mode '{0}': expected 'academic' or 'clinical'")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Ok(Mode::Academic),
            "clinical" => Ok(Mode::Clinical),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
