//! Shared domain enums

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Patient gender codes as exchanged with the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    /// Also absorbs any code the client does not recognise
    #[serde(other)]
    Other,
}

impl Gender {
    /// Canonical chart order
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl FromStr for Gender {
    type Err = AppError;

    /// Strict parsing for user input: accepts codes or labels, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            other => Err(AppError::invalid(format!(
                "Unknown gender '{}' (expected male, female or other)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        write!(f, "{}", label)
    }
}
