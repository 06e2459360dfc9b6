//! Prescription lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prescription state. `Active` is the only state a pharmacist can dispense from;
/// dispensing moves it straight to `Expired` so it can never be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionStatus {
    Active,
    Dispensed,
    Expired,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown prescription status: {0}")]
pub struct UnknownPrescriptionStatus(pub String);

impl PrescriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Dispensed => "Dispensed",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrescriptionStatus {
    type Err = UnknownPrescriptionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Dispensed" => Ok(Self::Dispensed),
            "Expired" => Ok(Self::Expired),
            other => Err(UnknownPrescriptionStatus(other.to_owned())),
        }
    }
}
