//! Account role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Immutable role tag fixed at registration.
///
/// Wire and storage format: lowercase string (`"doctor"`, `"pharmacist"`, `"patient"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Doctor,
    Pharmacist,
    Patient,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Pharmacist => "pharmacist",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "pharmacist" => Ok(Self::Pharmacist),
            "patient" => Ok(Self::Patient),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
