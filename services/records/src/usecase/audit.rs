use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::PatientId;

use crate::domain::repository::AuditRepository;
use crate::domain::types::{AuditActors, AuditRecord, NewAuditEntry};
use crate::error::RecordsServiceError;

/// Append-only record of authorization-relevant events.
///
/// Writers that change state alongside an entry build it with [`AuditLog::entry`] and hand
/// it to their own repository so both land in one transaction. Standalone events, such as
/// denials, go through [`AuditLog::record`].
pub struct AuditLog<A, C>
where
    A: AuditRepository,
    C: Clock,
{
    pub entries: A,
    pub clock: C,
}

impl<A, C> AuditLog<A, C>
where
    A: AuditRepository,
    C: Clock,
{
    /// An entry stamped with the current time.
    pub fn entry(&self, action: AuditAction, success: bool, actors: AuditActors) -> NewAuditEntry {
        NewAuditEntry::new(action, success, actors, self.clock.now())
    }

    pub async fn record(&self, entry: NewAuditEntry) -> Result<(), RecordsServiceError> {
        self.entries.append(&entry).await
    }

    /// Everything recorded about `patient_id`, newest first.
    pub async fn for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AuditRecord>, RecordsServiceError> {
        self.entries.list_for_patient(patient_id).await
    }
}
