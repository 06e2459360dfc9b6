use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId, PharmacistId, UserId};
use medgate_domain::prescription::PrescriptionStatus;
use medgate_domain::role::UserRole;

/// Prefix of the payload encoded in a prescription's QR code.
pub const QR_PREFIX: &str = "MEDGATE:";

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DoctorProfile {
    pub id: DoctorId,
    pub user_id: UserId,
    pub full_name: String,
    pub registration_number: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PharmacistProfile {
    pub id: PharmacistId,
    pub user_id: UserId,
    pub full_name: String,
    pub pharmacy_name: Option<String>,
    pub license_number: String,
}

#[derive(Debug, Clone)]
pub struct PatientProfile {
    pub id: PatientId,
    pub user_id: UserId,
    pub full_name: String,
    pub mobile: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
}

/// Role-specific profile created together with its user.
#[derive(Debug, Clone)]
pub enum Profile {
    Doctor(DoctorProfile),
    Pharmacist(PharmacistProfile),
    Patient(PatientProfile),
}

impl Profile {
    pub fn role(&self) -> UserRole {
        match self {
            Self::Doctor(_) => UserRole::Doctor,
            Self::Pharmacist(_) => UserRole::Pharmacist,
            Self::Patient(_) => UserRole::Patient,
        }
    }
}

// ── Sessions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is usable up to and including `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

// ── Consent ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewVerificationCode {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A stored code. `id` comes from a database sequence and breaks ties between codes
/// created at the same instant.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: i64,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewAccessGrant {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub code_id: i64,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub id: i64,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub code_id: i64,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessGrant {
    /// Active strictly before `expires_at`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

// ── Audit ────────────────────────────────────────────────────────────────────

/// Who an audit entry is about. All references are optional and unchecked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditActors {
    pub doctor_id: Option<DoctorId>,
    pub pharmacist_id: Option<PharmacistId>,
    pub patient_id: Option<PatientId>,
}

impl AuditActors {
    pub fn doctor_on(doctor_id: DoctorId, patient_id: PatientId) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            pharmacist_id: None,
            patient_id: Some(patient_id),
        }
    }

    pub fn pharmacist_on(pharmacist_id: PharmacistId, patient_id: PatientId) -> Self {
        Self {
            doctor_id: None,
            pharmacist_id: Some(pharmacist_id),
            patient_id: Some(patient_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actors: AuditActors,
    pub action: AuditAction,
    pub success: bool,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewAuditEntry {
    pub fn new(
        action: AuditAction,
        success: bool,
        actors: AuditActors,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actors,
            action,
            success,
            detail: None,
            created_at,
            expires_at: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// An audit entry as shown to the patient, with actor names resolved.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: i64,
    pub action: AuditAction,
    pub success: bool,
    pub detail: Option<String>,
    pub doctor_name: Option<String>,
    pub pharmacist_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

// ── Catalog & prescriptions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Medicine {
    pub id: i32,
    pub brand_name: String,
    pub generic_name: String,
    pub indications: Option<String>,
    pub standard_dosage: Option<String>,
    pub precautions: Option<String>,
}

/// Catalog entry as copied into a prescription, plus the dosage the doctor chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub medicine_id: i32,
    pub brand_name: String,
    pub generic_name: String,
    pub dosage: Option<String>,
    pub indications: Option<String>,
    pub standard_dosage: Option<String>,
    pub precautions: Option<String>,
}

impl PrescribedMedicine {
    /// Snapshot `medicine`; a blank `dosage` falls back to the catalog's standard dosage.
    pub fn from_catalog(medicine: &Medicine, dosage: Option<&str>) -> Self {
        let dosage = dosage
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned)
            .or_else(|| medicine.standard_dosage.clone());
        Self {
            medicine_id: medicine.id,
            brand_name: medicine.brand_name.clone(),
            generic_name: medicine.generic_name.clone(),
            dosage,
            indications: medicine.indications.clone(),
            standard_dosage: medicine.standard_dosage.clone(),
            precautions: medicine.precautions.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prescription {
    pub id: String,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub medicines: Vec<PrescribedMedicine>,
    pub doctor_notes: Option<String>,
    pub digital_signature: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: DateTime<Utc>,
    pub dispensed_at: Option<DateTime<Utc>>,
    pub pharmacist_id: Option<PharmacistId>,
    pub qr_payload: String,
}

/// A prescription joined with the names needed to display it.
#[derive(Debug, Clone)]
pub struct PrescriptionDetail {
    pub prescription: Prescription,
    pub doctor_name: String,
    pub doctor_registration_number: String,
    pub patient_name: String,
    pub patient_mobile: String,
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewReport {
    pub patient_id: PatientId,
    pub uploader_user_id: UserId,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub id: i64,
    pub patient_id: PatientId,
    pub uploader_user_id: UserId,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExternalPrescription {
    pub patient_id: PatientId,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExternalPrescription {
    pub id: i64,
    pub patient_id: PatientId,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// File bytes ready to be sent back under their original name.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
