//! sea-orm entities for the records service.

pub mod access_grants;
pub mod audit_entries;
pub mod doctors;
pub mod external_prescriptions;
pub mod medicines;
pub mod patients;
pub mod pharmacists;
pub mod prescriptions;
pub mod reports;
pub mod sessions;
pub mod users;
pub mod verification_codes;
