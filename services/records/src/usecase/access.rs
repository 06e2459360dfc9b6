use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId};

use crate::domain::repository::{AuditRepository, GrantRepository};
use crate::domain::types::AuditActors;
use crate::error::RecordsServiceError;
use crate::usecase::audit::AuditLog;

/// Answers whether a doctor currently holds an unexpired grant for a patient.
pub struct AccessGate<G, C>
where
    G: GrantRepository,
    C: Clock,
{
    pub grants: G,
    pub clock: C,
}

impl<G, C> AccessGate<G, C>
where
    G: GrantRepository,
    C: Clock,
{
    /// Only the most recent grant for the pair counts.
    pub async fn has_access(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<bool, RecordsServiceError> {
        let grant = self.grants.latest_grant(doctor_id, patient_id).await?;
        Ok(grant.is_some_and(|g| g.is_active_at(self.clock.now())))
    }

    /// Checkpoint for delegated operations. A denial appends exactly one failure entry
    /// tagged with `action` and returns `AccessDenied`.
    pub async fn require<A, AC>(
        &self,
        audit: &AuditLog<A, AC>,
        doctor_id: DoctorId,
        patient_id: PatientId,
        action: AuditAction,
    ) -> Result<(), RecordsServiceError>
    where
        A: AuditRepository,
        AC: Clock,
    {
        if self.has_access(doctor_id, patient_id).await? {
            return Ok(());
        }

        tracing::warn!(%doctor_id, %patient_id, action = %action, "delegated access denied");
        let entry = audit
            .entry(action, false, AuditActors::doctor_on(doctor_id, patient_id))
            .with_detail("No active access grant");
        audit.record(entry).await?;
        Err(RecordsServiceError::AccessDenied)
    }
}
