//! Letter-case folding for textual output fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Case folding applied to the textual fields of scanned output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Leave strings untouched.
    #[default]
    Mixed,
    /// Fold to upper case.
    Upper,
    /// Fold to lower case.
    Lower,
}

impl CaseMode {
    /// Convert the input string to this mode's case.
    pub fn convert(&self, s: &str) -> String {
        match self {
            CaseMode::Mixed => s.to_string(),
            CaseMode::Upper => s.to_uppercase(),
            CaseMode::Lower => s.to_lowercase(),
        }
    }
}

impl FromStr for CaseMode {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MIXED" => Ok(CaseMode::Mixed),
            "UPPER" => Ok(CaseMode::Upper),
            "LOWER" => Ok(CaseMode::Lower),
            _ => Err(ImportError::ParameterInvalid("case".into())),
        }
    }
}
