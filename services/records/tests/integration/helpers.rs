use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId, PharmacistId, UserId};
use medgate_domain::prescription::PrescriptionStatus;
use medgate_domain::role::UserRole;
use medgate_testing::clock::ManualClock;

use medgate_records::domain::repository::{
    AuditRepository, ConsentRepository, FileStorage, GrantRepository, MedicineRepository,
    PrescriptionRepository, SessionRepository, UploadRepository, UserRepository,
};
use medgate_records::domain::types::{
    AccessGrant, AuditRecord, DoctorProfile, ExternalPrescription, Medicine, NewAccessGrant,
    NewAuditEntry, NewExternalPrescription, NewReport, NewVerificationCode, PatientProfile,
    PharmacistProfile, Prescription, PrescriptionDetail, Profile, Report, Session, User,
    VerificationCode,
};
use medgate_records::error::RecordsServiceError;
use medgate_records::usecase::access::AccessGate;
use medgate_records::usecase::audit::AuditLog;
use medgate_records::usecase::consent::ConsentLedger;
use medgate_records::usecase::session::SessionStore;

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub doctors: Vec<DoctorProfile>,
    pub pharmacists: Vec<PharmacistProfile>,
    pub patients: Vec<PatientProfile>,
    pub sessions: HashMap<String, Session>,
    pub codes: Vec<VerificationCode>,
    pub grants: Vec<AccessGrant>,
    pub audit: Vec<(i64, NewAuditEntry)>,
    pub medicines: Vec<Medicine>,
    pub prescriptions: Vec<Prescription>,
    pub reports: Vec<Report>,
    pub external: Vec<ExternalPrescription>,
    /// Makes upload metadata inserts fail, as a broken transaction would.
    pub reject_uploads: bool,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn push_audit(&mut self, entry: &NewAuditEntry) {
        let id = self.next_id();
        self.audit.push((id, entry.clone()));
    }

    fn detail(&self, p: &Prescription) -> Option<PrescriptionDetail> {
        let doctor = self.doctors.iter().find(|d| d.id == p.doctor_id)?;
        let patient = self.patients.iter().find(|x| x.id == p.patient_id)?;
        Some(PrescriptionDetail {
            prescription: p.clone(),
            doctor_name: doctor.full_name.clone(),
            doctor_registration_number: doctor.registration_number.clone(),
            patient_name: patient.full_name.clone(),
            patient_mobile: patient.mobile.clone(),
        })
    }
}

/// Every repository port over one shared set of tables. Clones share state, and each
/// multi-row write happens under a single lock, mirroring a database transaction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn audit_entries(&self) -> Vec<NewAuditEntry> {
        self.tables
            .lock()
            .unwrap()
            .audit
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn grants(&self) -> Vec<AccessGrant> {
        self.tables.lock().unwrap().grants.clone()
    }

    pub fn codes(&self) -> Vec<VerificationCode> {
        self.tables.lock().unwrap().codes.clone()
    }

    /// Overwrite a stored code so a test can work with a known value.
    pub fn set_code(&self, code_id: i64, value: &str) {
        let mut tables = self.tables.lock().unwrap();
        let code = tables.codes.iter_mut().find(|c| c.id == code_id).unwrap();
        code.code = value.to_owned();
    }

    pub fn reject_uploads(&self) {
        self.tables.lock().unwrap().reject_uploads = true;
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.tables.lock().unwrap().sessions.contains_key(token)
    }

    pub fn prescription(&self, id: &str) -> Option<Prescription> {
        self.tables
            .lock()
            .unwrap()
            .prescriptions
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

impl UserRepository for MemoryStore {
    async fn create_account(&self, user: &User, profile: &Profile) -> Result<(), RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        let taken = t.users.iter().any(|u| u.email == user.email)
            || match profile {
                Profile::Doctor(d) => t
                    .doctors
                    .iter()
                    .any(|x| x.registration_number == d.registration_number),
                Profile::Pharmacist(p) => t
                    .pharmacists
                    .iter()
                    .any(|x| x.license_number == p.license_number),
                Profile::Patient(p) => t.patients.iter().any(|x| x.mobile == p.mobile),
            };
        if taken {
            return Err(RecordsServiceError::AlreadyExists);
        }
        t.users.push(user.clone());
        match profile {
            Profile::Doctor(d) => t.doctors.push(d.clone()),
            Profile::Pharmacist(p) => t.pharmacists.push(p.clone()),
            Profile::Patient(p) => t.patients.push(p.clone()),
        }
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn doctor_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<DoctorProfile>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.doctors.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn pharmacist_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PharmacistProfile>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.pharmacists.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn patient_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.patients.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_patient(
        &self,
        id: PatientId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn find_patient_by_mobile(
        &self,
        mobile: &str,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.patients.iter().find(|p| p.mobile == mobile).cloned())
    }
}

impl SessionRepository for MemoryStore {
    async fn create(&self, session: &Session) -> Result<(), RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        t.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, RecordsServiceError> {
        Ok(self.tables.lock().unwrap().sessions.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<(), RecordsServiceError> {
        self.tables.lock().unwrap().sessions.remove(token);
        Ok(())
    }
}

impl ConsentRepository for MemoryStore {
    async fn create_code(
        &self,
        code: &NewVerificationCode,
        audit: &NewAuditEntry,
    ) -> Result<VerificationCode, RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        let stored = VerificationCode {
            id: t.next_id(),
            doctor_id: code.doctor_id,
            patient_id: code.patient_id,
            code: code.code.clone(),
            created_at: code.created_at,
            expires_at: code.expires_at,
            verified_at: None,
        };
        t.codes.push(stored.clone());
        t.push_audit(audit);
        Ok(stored)
    }

    async fn latest_code(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<VerificationCode>, RecordsServiceError> {
        let latest = {
            let t = self.tables.lock().unwrap();
            t.codes
                .iter()
                .filter(|c| c.doctor_id == doctor_id && c.patient_id == patient_id)
                .max_by_key(|c| (c.created_at, c.id))
                .cloned()
        };
        // Let a concurrent verification read the same row before either consumes it.
        tokio::task::yield_now().await;
        Ok(latest)
    }

    async fn verify_and_grant(
        &self,
        verified_at: DateTime<Utc>,
        grant: &NewAccessGrant,
        audit: &NewAuditEntry,
    ) -> Result<Option<AccessGrant>, RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(code) = t
            .codes
            .iter_mut()
            .find(|c| c.id == grant.code_id && c.verified_at.is_none())
        else {
            return Ok(None);
        };
        code.verified_at = Some(verified_at);

        let stored = AccessGrant {
            id: t.next_id(),
            doctor_id: grant.doctor_id,
            patient_id: grant.patient_id,
            code_id: grant.code_id,
            granted_at: grant.granted_at,
            expires_at: grant.expires_at,
        };
        t.grants.push(stored.clone());
        t.push_audit(audit);
        Ok(Some(stored))
    }
}

impl GrantRepository for MemoryStore {
    async fn latest_grant(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<AccessGrant>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.grants
            .iter()
            .filter(|g| g.doctor_id == doctor_id && g.patient_id == patient_id)
            .max_by_key(|g| (g.granted_at, g.id))
            .cloned())
    }
}

impl AuditRepository for MemoryStore {
    async fn append(&self, entry: &NewAuditEntry) -> Result<(), RecordsServiceError> {
        self.tables.lock().unwrap().push_audit(entry);
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AuditRecord>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<&(i64, NewAuditEntry)> = t
            .audit
            .iter()
            .filter(|(_, e)| e.actors.patient_id == Some(patient_id))
            .collect();
        rows.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(rows
            .into_iter()
            .map(|(id, e)| AuditRecord {
                id: *id,
                action: e.action,
                success: e.success,
                detail: e.detail.clone(),
                doctor_name: e.actors.doctor_id.and_then(|d| {
                    t.doctors
                        .iter()
                        .find(|x| x.id == d)
                        .map(|x| x.full_name.clone())
                }),
                pharmacist_name: e.actors.pharmacist_id.and_then(|p| {
                    t.pharmacists
                        .iter()
                        .find(|x| x.id == p)
                        .map(|x| x.full_name.clone())
                }),
                created_at: e.created_at,
                expires_at: e.expires_at,
            })
            .collect())
    }
}

impl MedicineRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Medicine>, RecordsServiceError> {
        let mut medicines = self.tables.lock().unwrap().medicines.clone();
        medicines.sort_by(|a, b| a.brand_name.cmp(&b.brand_name));
        Ok(medicines)
    }
}

impl PrescriptionRepository for MemoryStore {
    async fn create(
        &self,
        prescription: &Prescription,
        audit: &NewAuditEntry,
    ) -> Result<(), RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        t.prescriptions.push(prescription.clone());
        t.push_audit(audit);
        Ok(())
    }

    async fn find_detail(
        &self,
        id: &str,
    ) -> Result<Option<PrescriptionDetail>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.prescriptions
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| t.detail(p)))
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<PrescriptionDetail>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        let mut details: Vec<PrescriptionDetail> = t
            .prescriptions
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .filter_map(|p| t.detail(p))
            .collect();
        details.sort_by(|a, b| b.prescription.created_at.cmp(&a.prescription.created_at));
        Ok(details)
    }

    async fn dispense(
        &self,
        id: &str,
        pharmacist_id: PharmacistId,
        dispensed_at: DateTime<Utc>,
        audit: &NewAuditEntry,
    ) -> Result<bool, RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(p) = t
            .prescriptions
            .iter_mut()
            .find(|p| p.id == id && p.status == PrescriptionStatus::Active)
        else {
            return Ok(false);
        };
        p.status = PrescriptionStatus::Expired;
        p.dispensed_at = Some(dispensed_at);
        p.pharmacist_id = Some(pharmacist_id);
        t.push_audit(audit);
        Ok(true)
    }
}

impl UploadRepository for MemoryStore {
    async fn create_report(
        &self,
        report: &NewReport,
        audit: &NewAuditEntry,
    ) -> Result<Report, RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        if t.reject_uploads {
            return Err(anyhow::anyhow!("report insert rejected").into());
        }
        let stored = Report {
            id: t.next_id(),
            patient_id: report.patient_id,
            uploader_user_id: report.uploader_user_id,
            file_name: report.file_name.clone(),
            storage_key: report.storage_key.clone(),
            uploaded_at: report.uploaded_at,
        };
        t.reports.push(stored.clone());
        t.push_audit(audit);
        Ok(stored)
    }

    async fn find_report(&self, id: i64) -> Result<Option<Report>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reports(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Report>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        let mut reports: Vec<Report> = t
            .reports
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(reports)
    }

    async fn create_external(
        &self,
        upload: &NewExternalPrescription,
    ) -> Result<ExternalPrescription, RecordsServiceError> {
        let mut t = self.tables.lock().unwrap();
        if t.reject_uploads {
            return Err(anyhow::anyhow!("external insert rejected").into());
        }
        let stored = ExternalPrescription {
            id: t.next_id(),
            patient_id: upload.patient_id,
            file_name: upload.file_name.clone(),
            storage_key: upload.storage_key.clone(),
            uploaded_at: upload.uploaded_at,
        };
        t.external.push(stored.clone());
        Ok(stored)
    }

    async fn find_external(
        &self,
        id: i64,
    ) -> Result<Option<ExternalPrescription>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.external.iter().find(|e| e.id == id).cloned())
    }

    async fn list_external(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ExternalPrescription>, RecordsServiceError> {
        let t = self.tables.lock().unwrap();
        let mut uploads: Vec<ExternalPrescription> = t
            .external
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect();
        uploads.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(uploads)
    }
}

// ── MemoryStorage ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn remove_all(&self) {
        self.files.lock().unwrap().clear();
    }
}

impl FileStorage for MemoryStorage {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), RecordsServiceError> {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, RecordsServiceError> {
        Ok(self.files.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), RecordsServiceError> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────────

pub fn test_user(role: UserRole, email: &str, at: DateTime<Utc>) -> User {
    User {
        id: UserId::generate(),
        email: email.to_owned(),
        password_hash: "not-a-real-hash".to_owned(),
        role,
        created_at: at,
    }
}

pub fn test_medicines() -> Vec<Medicine> {
    vec![
        Medicine {
            id: 1,
            brand_name: "Dolo 650".to_owned(),
            generic_name: "Paracetamol".to_owned(),
            indications: Some("Fever, mild pain".to_owned()),
            standard_dosage: Some("1 tablet every 6 hours".to_owned()),
            precautions: Some("Do not exceed 4 g per day".to_owned()),
        },
        Medicine {
            id: 2,
            brand_name: "Augmentin 625".to_owned(),
            generic_name: "Amoxicillin + Clavulanate".to_owned(),
            indications: Some("Bacterial infections".to_owned()),
            standard_dosage: Some("1 tablet twice daily".to_owned()),
            precautions: None,
        },
    ]
}

/// One doctor, one pharmacist and one patient over a fresh store, with time frozen at
/// [`ManualClock::epoch`].
pub struct Fixture {
    pub store: MemoryStore,
    pub storage: MemoryStorage,
    pub clock: ManualClock,
    pub doctor: DoctorProfile,
    pub pharmacist: PharmacistProfile,
    pub patient: PatientProfile,
}

impl Fixture {
    pub fn new() -> Self {
        let clock = ManualClock::epoch();
        let now = clock.now();
        let store = MemoryStore::default();

        let doctor_user = test_user(UserRole::Doctor, "asha.rao@clinic.test", now);
        let pharmacist_user = test_user(UserRole::Pharmacist, "meera@pharmacy.test", now);
        let patient_user = test_user(UserRole::Patient, "ravi@mail.test", now);

        let doctor = DoctorProfile {
            id: DoctorId::generate(),
            user_id: doctor_user.id,
            full_name: "Dr. Asha Rao".to_owned(),
            registration_number: "MCI-1001".to_owned(),
            specialization: Some("General Medicine".to_owned()),
        };
        let pharmacist = PharmacistProfile {
            id: PharmacistId::generate(),
            user_id: pharmacist_user.id,
            full_name: "Meera Iyer".to_owned(),
            pharmacy_name: Some("City Pharmacy".to_owned()),
            license_number: "PH-2001".to_owned(),
        };
        let patient = PatientProfile {
            id: PatientId::generate(),
            user_id: patient_user.id,
            full_name: "Ravi Kumar".to_owned(),
            mobile: "9000000001".to_owned(),
            dob: Some("1990-04-12".to_owned()),
            gender: Some("male".to_owned()),
            allergies: vec!["penicillin".to_owned()],
            chronic_conditions: vec![],
        };

        {
            let mut t = store.tables.lock().unwrap();
            t.users = vec![doctor_user, pharmacist_user, patient_user];
            t.doctors.push(doctor.clone());
            t.pharmacists.push(pharmacist.clone());
            t.patients.push(patient.clone());
            t.medicines = test_medicines();
        }

        Self {
            store,
            storage: MemoryStorage::default(),
            clock,
            doctor,
            pharmacist,
            patient,
        }
    }

    pub fn sessions(&self) -> SessionStore<MemoryStore, ManualClock> {
        SessionStore {
            sessions: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn audit_log(&self) -> AuditLog<MemoryStore, ManualClock> {
        AuditLog {
            entries: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn gate(&self) -> AccessGate<MemoryStore, ManualClock> {
        AccessGate {
            grants: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn ledger(&self) -> ConsentLedger<MemoryStore, MemoryStore, MemoryStore, ManualClock> {
        ConsentLedger {
            codes: self.store.clone(),
            users: self.store.clone(),
            audit: self.audit_log(),
            clock: self.clock.clone(),
        }
    }

    /// Issue a code for the fixture pair and verify it straight away.
    pub async fn grant_access(&self) -> AccessGrant {
        let ledger = self.ledger();
        let issued = ledger
            .issue_code(self.doctor.id, self.patient.id)
            .await
            .unwrap();
        ledger
            .verify_code(self.doctor.id, self.patient.id, &issued.code)
            .await
            .unwrap()
    }

    /// Audit entries tagged `action`, in insertion order.
    pub fn entries_for(&self, action: AuditAction) -> Vec<NewAuditEntry> {
        self.store
            .audit_entries()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }

    pub fn failures_for(&self, action: AuditAction) -> usize {
        self.entries_for(action)
            .iter()
            .filter(|e| !e.success)
            .count()
    }
}
