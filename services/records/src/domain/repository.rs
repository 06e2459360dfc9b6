#![allow(async_fn_in_trait)]

use medgate_domain::id::{DoctorId, PatientId, PharmacistId, UserId};

use chrono::{DateTime, Utc};

use crate::domain::types::{
    AccessGrant, AuditRecord, DoctorProfile, ExternalPrescription, Medicine, NewAccessGrant,
    NewAuditEntry, NewExternalPrescription, NewReport, NewVerificationCode, PatientProfile,
    PharmacistProfile, Prescription, PrescriptionDetail, Profile, Report, Session, User,
    VerificationCode,
};
use crate::error::RecordsServiceError;

/// Users and their role profiles.
pub trait UserRepository: Send + Sync {
    /// Insert a user and its profile atomically.
    /// Any unique-key collision yields `AlreadyExists` and writes nothing.
    async fn create_account(&self, user: &User, profile: &Profile)
    -> Result<(), RecordsServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RecordsServiceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RecordsServiceError>;

    async fn doctor_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<DoctorProfile>, RecordsServiceError>;

    async fn pharmacist_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PharmacistProfile>, RecordsServiceError>;

    async fn patient_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError>;

    async fn find_patient(
        &self,
        id: PatientId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError>;

    async fn find_patient_by_mobile(
        &self,
        mobile: &str,
    ) -> Result<Option<PatientProfile>, RecordsServiceError>;
}

/// Bearer sessions keyed by token.
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), RecordsServiceError>;

    async fn find(&self, token: &str) -> Result<Option<Session>, RecordsServiceError>;

    /// Delete a session. Deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<(), RecordsServiceError>;
}

/// Verification codes and the grants they produce.
pub trait ConsentRepository: Send + Sync {
    /// Insert a code and its `OTP_SENT` audit entry in one transaction.
    async fn create_code(
        &self,
        code: &NewVerificationCode,
        audit: &NewAuditEntry,
    ) -> Result<VerificationCode, RecordsServiceError>;

    /// Most recently issued code for the pair: latest `created_at`, then highest `id`.
    async fn latest_code(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<VerificationCode>, RecordsServiceError>;

    /// In one transaction: set `verified_at` on the code only if it is still unverified,
    /// then insert the grant and the audit entry.
    ///
    /// Returns `None` (and writes nothing) when the code was already verified.
    async fn verify_and_grant(
        &self,
        verified_at: DateTime<Utc>,
        grant: &NewAccessGrant,
        audit: &NewAuditEntry,
    ) -> Result<Option<AccessGrant>, RecordsServiceError>;
}

/// Read side of access grants.
pub trait GrantRepository: Send + Sync {
    /// Most recently issued grant for the pair.
    async fn latest_grant(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<AccessGrant>, RecordsServiceError>;
}

/// Append-only audit trail.
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &NewAuditEntry) -> Result<(), RecordsServiceError>;

    /// Entries about a patient, newest first (`created_at DESC, id DESC`).
    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AuditRecord>, RecordsServiceError>;
}

pub trait MedicineRepository: Send + Sync {
    /// Whole catalog ordered by brand name.
    async fn list_all(&self) -> Result<Vec<Medicine>, RecordsServiceError>;
}

pub trait PrescriptionRepository: Send + Sync {
    /// Insert a prescription and its `PRESCRIPTION_CREATE` audit entry in one transaction.
    async fn create(
        &self,
        prescription: &Prescription,
        audit: &NewAuditEntry,
    ) -> Result<(), RecordsServiceError>;

    async fn find_detail(&self, id: &str)
    -> Result<Option<PrescriptionDetail>, RecordsServiceError>;

    /// A patient's prescriptions, newest first.
    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<PrescriptionDetail>, RecordsServiceError>;

    /// Move an `Active` prescription to `Expired`, recording the pharmacist and time,
    /// together with the `DISPENSED` audit entry.
    ///
    /// Returns `false` (and writes nothing) if the prescription was no longer active.
    async fn dispense(
        &self,
        id: &str,
        pharmacist_id: PharmacistId,
        dispensed_at: DateTime<Utc>,
        audit: &NewAuditEntry,
    ) -> Result<bool, RecordsServiceError>;
}

/// Metadata for uploaded files. Bytes live in [`FileStorage`].
pub trait UploadRepository: Send + Sync {
    /// Insert a report row and its `REPORT_UPLOAD` audit entry in one transaction.
    async fn create_report(
        &self,
        report: &NewReport,
        audit: &NewAuditEntry,
    ) -> Result<Report, RecordsServiceError>;

    async fn find_report(&self, id: i64) -> Result<Option<Report>, RecordsServiceError>;

    async fn list_reports(&self, patient_id: PatientId)
    -> Result<Vec<Report>, RecordsServiceError>;

    async fn create_external(
        &self,
        upload: &NewExternalPrescription,
    ) -> Result<ExternalPrescription, RecordsServiceError>;

    async fn find_external(
        &self,
        id: i64,
    ) -> Result<Option<ExternalPrescription>, RecordsServiceError>;

    async fn list_external(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ExternalPrescription>, RecordsServiceError>;
}

/// Blob store for uploaded files.
pub trait FileStorage: Send + Sync {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), RecordsServiceError>;

    /// `None` if nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, RecordsServiceError>;

    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), RecordsServiceError>;
}
