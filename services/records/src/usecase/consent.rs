//! Consent ledger: one-time verification codes and the access grants they produce.
//!
//! A doctor asks for a code for one patient; the patient reads it back to the doctor, who
//! submits it. A matching, unexpired, unverified code is consumed exactly once and yields a
//! grant lasting [`ACCESS_WINDOW_MINUTES`]. Issuing a new code does not touch older ones;
//! they simply stop being the latest and are never looked up again.

use chrono::{DateTime, Duration, Utc};

use medgate_auth_types::code::{ACCESS_WINDOW_MINUTES, codes_match, generate_verification_code};
use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId};

use crate::domain::repository::{AuditRepository, ConsentRepository, UserRepository};
use crate::domain::types::{
    AccessGrant, AuditActors, NewAccessGrant, NewAuditEntry, NewVerificationCode,
};
use crate::error::RecordsServiceError;
use crate::usecase::audit::AuditLog;

/// A freshly issued code. The code itself is returned to the caller because delivery to
/// the patient is simulated.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub struct ConsentLedger<R, U, A, C>
where
    R: ConsentRepository,
    U: UserRepository,
    A: AuditRepository,
    C: Clock,
{
    pub codes: R,
    pub users: U,
    pub audit: AuditLog<A, C>,
    pub clock: C,
}

impl<R, U, A, C> ConsentLedger<R, U, A, C>
where
    R: ConsentRepository,
    U: UserRepository,
    A: AuditRepository,
    C: Clock,
{
    pub async fn issue_code(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<IssuedCode, RecordsServiceError> {
        self.users
            .find_patient(patient_id)
            .await?
            .ok_or(RecordsServiceError::PatientNotFound)?;

        let now = self.clock.now();
        let expires_at = now + Duration::minutes(ACCESS_WINDOW_MINUTES);
        let code = NewVerificationCode {
            doctor_id,
            patient_id,
            code: generate_verification_code(),
            created_at: now,
            expires_at,
        };
        let audit = NewAuditEntry::new(
            AuditAction::OtpSent,
            true,
            AuditActors::doctor_on(doctor_id, patient_id),
            now,
        )
        .with_detail("Verification code issued (simulated delivery)")
        .with_expiry(expires_at);

        let stored = self.codes.create_code(&code, &audit).await?;
        tracing::info!(%doctor_id, %patient_id, code_id = stored.id, "verification code issued");

        Ok(IssuedCode {
            code: stored.code,
            expires_at: stored.expires_at,
        })
    }

    /// Consume the latest code for the pair and open an access window.
    ///
    /// A blank submission is rejected before any lookup and leaves no audit entry. After that
    /// checks run in a fixed order: missing, already used, expired, mismatched. Expired and
    /// mismatched attempts leave one failure entry; the submitted value is never logged.
    pub async fn verify_code(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
        submitted: &str,
    ) -> Result<AccessGrant, RecordsServiceError> {
        if submitted.trim().is_empty() {
            return Err(RecordsServiceError::MissingData("code"));
        }

        let code = self
            .codes
            .latest_code(doctor_id, patient_id)
            .await?
            .ok_or(RecordsServiceError::CodeNotFound)?;

        if code.is_verified() {
            return Err(RecordsServiceError::CodeAlreadyUsed);
        }

        let actors = AuditActors::doctor_on(doctor_id, patient_id);
        let now = self.clock.now();

        if code.is_expired_at(now) {
            tracing::warn!(%doctor_id, %patient_id, code_id = code.id, "verification code expired");
            self.audit
                .record(
                    NewAuditEntry::new(AuditAction::OtpVerify, false, actors, now)
                        .with_detail("Verification code expired")
                        .with_expiry(code.expires_at),
                )
                .await?;
            return Err(RecordsServiceError::CodeExpired);
        }

        if !codes_match(&code.code, submitted) {
            tracing::warn!(%doctor_id, %patient_id, code_id = code.id, "verification code mismatch");
            self.audit
                .record(
                    NewAuditEntry::new(AuditAction::OtpVerify, false, actors, now)
                        .with_detail("Verification code mismatch"),
                )
                .await?;
            return Err(RecordsServiceError::CodeMismatch);
        }

        let expires_at = now + Duration::minutes(ACCESS_WINDOW_MINUTES);
        let grant = NewAccessGrant {
            doctor_id,
            patient_id,
            code_id: code.id,
            granted_at: now,
            expires_at,
        };
        let audit = NewAuditEntry::new(AuditAction::OtpVerify, true, actors, now)
            .with_detail("Patient access granted")
            .with_expiry(expires_at);

        let grant = self
            .codes
            .verify_and_grant(now, &grant, &audit)
            .await?
            .ok_or(RecordsServiceError::CodeAlreadyUsed)?;

        tracing::info!(
            %doctor_id,
            %patient_id,
            grant_id = grant.id,
            expires_at = %grant.expires_at,
            "patient access granted"
        );
        Ok(grant)
    }
}
