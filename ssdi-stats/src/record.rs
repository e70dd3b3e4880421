//! Validated Measurement Records

use serde::{Deserialize, Serialize};

/// Sex of a measured individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

impl Sex {
    /// Parse a sex code, accepting `m`/`M` and `f`/`F` only.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" | "M" => Some(Sex::Male),
            "f" | "F" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
        }
    }
}

/// One validated body-size measurement
///
/// The species string is kept verbatim: `"Emys orbicularis"` and
/// `"Emys_orbicularis"` are different species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Species name, matched exactly
    pub species: String,
    /// Sex of the measured individual
    pub sex: Sex,
    /// Body size, strictly positive
    pub size: f64,
}

impl Record {
    /// Create a record
    pub fn new(species: impl Into<String>, sex: Sex, size: f64) -> Self {
        Self {
            species: species.into(),
            sex,
            size,
        }
    }
}
