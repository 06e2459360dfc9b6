//! Newtype wrappers for domain identifiers.
//!
//! Accounts and role profiles are keyed by UUIDs. Append-only rows (codes, grants,
//! audit entries) use database sequences instead and are not wrapped here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh time-ordered identifier.
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifies a login account.
    UserId
);

uuid_id!(
    /// Identifies a doctor profile (the requesting professional).
    DoctorId
);

uuid_id!(
    /// Identifies a pharmacist profile.
    PharmacistId
);

uuid_id!(
    /// Identifies a patient profile (the subject of delegated access).
    PatientId
);
