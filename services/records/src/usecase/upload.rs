use chrono::{DateTime, Utc};
use rand::RngExt;

use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId, UserId};
use medgate_domain::role::UserRole;

use crate::domain::repository::{
    AuditRepository, FileStorage, GrantRepository, UploadRepository, UserRepository,
};
use crate::domain::types::{
    AuditActors, Download, ExternalPrescription, NewAuditEntry, NewExternalPrescription,
    NewReport, Report,
};
use crate::error::RecordsServiceError;
use crate::usecase::access::AccessGate;
use crate::usecase::audit::AuditLog;

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9._-]` is removed. Leading dots are stripped so the result is never hidden
/// or a parent reference. Returns `None` if nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

/// Unique storage key: `<yyyymmddHHMMSS>_<8 hex>_<name>`.
pub fn storage_key(now: DateTime<Utc>, safe_name: &str) -> String {
    let nonce: u32 = rand::rng().random();
    format!("{}_{nonce:08x}_{safe_name}", now.format("%Y%m%d%H%M%S"))
}

fn prepare(upload: &FileUpload) -> Result<String, RecordsServiceError> {
    if upload.bytes.is_empty() {
        return Err(RecordsServiceError::MissingData("file"));
    }
    sanitize_file_name(&upload.file_name).ok_or(RecordsServiceError::MissingData("file"))
}

/// Best-effort removal of a blob whose metadata row was never written.
async fn discard<S: FileStorage>(storage: &S, key: &str) {
    if let Err(e) = storage.delete(key).await {
        tracing::warn!(error = %e, key, "failed to remove orphaned upload");
    }
}

// ── Report upload (gated write) ──────────────────────────────────────────────

pub struct UploadReportUseCase<U, F, S, G, A, C>
where
    U: UserRepository,
    F: UploadRepository,
    S: FileStorage,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub users: U,
    pub uploads: F,
    pub storage: S,
    pub gate: AccessGate<G, C>,
    pub audit: AuditLog<A, C>,
}

impl<U, F, S, G, A, C> UploadReportUseCase<U, F, S, G, A, C>
where
    U: UserRepository,
    F: UploadRepository,
    S: FileStorage,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        doctor_id: DoctorId,
        uploader: UserId,
        patient_id: PatientId,
        upload: FileUpload,
    ) -> Result<Report, RecordsServiceError> {
        let safe_name = prepare(&upload)?;

        self.gate
            .require(&self.audit, doctor_id, patient_id, AuditAction::ReportUpload)
            .await?;
        self.users
            .find_patient(patient_id)
            .await?
            .ok_or(RecordsServiceError::PatientNotFound)?;

        let now = self.audit.clock.now();
        let key = storage_key(now, &safe_name);
        self.storage.save(&key, &upload.bytes).await?;

        let report = NewReport {
            patient_id,
            uploader_user_id: uploader,
            file_name: safe_name.clone(),
            storage_key: key,
            uploaded_at: now,
        };
        let audit = NewAuditEntry::new(
            AuditAction::ReportUpload,
            true,
            AuditActors::doctor_on(doctor_id, patient_id),
            now,
        )
        .with_detail(safe_name);
        let report = match self.uploads.create_report(&report, &audit).await {
            Ok(report) => report,
            Err(e) => {
                discard(&self.storage, &report.storage_key).await;
                return Err(e);
            }
        };
        tracing::info!(%doctor_id, %patient_id, report_id = report.id, "report uploaded");
        Ok(report)
    }
}

// ── External prescription upload ─────────────────────────────────────────────

pub struct UploadExternalUseCase<F, S, C>
where
    F: UploadRepository,
    S: FileStorage,
    C: Clock,
{
    pub uploads: F,
    pub storage: S,
    pub clock: C,
}

impl<F, S, C> UploadExternalUseCase<F, S, C>
where
    F: UploadRepository,
    S: FileStorage,
    C: Clock,
{
    pub async fn execute(
        &self,
        patient_id: PatientId,
        upload: FileUpload,
    ) -> Result<ExternalPrescription, RecordsServiceError> {
        let safe_name = prepare(&upload)?;
        let now = self.clock.now();
        let key = storage_key(now, &safe_name);
        self.storage.save(&key, &upload.bytes).await?;

        let upload = NewExternalPrescription {
            patient_id,
            file_name: safe_name,
            storage_key: key,
            uploaded_at: now,
        };
        match self.uploads.create_external(&upload).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                discard(&self.storage, &upload.storage_key).await;
                Err(e)
            }
        }
    }
}

// ── Downloads ────────────────────────────────────────────────────────────────

pub struct DownloadReportUseCase<U, F, S, G, A, C>
where
    U: UserRepository,
    F: UploadRepository,
    S: FileStorage,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub users: U,
    pub uploads: F,
    pub storage: S,
    pub gate: AccessGate<G, C>,
    pub audit: AuditLog<A, C>,
}

impl<U, F, S, G, A, C> DownloadReportUseCase<U, F, S, G, A, C>
where
    U: UserRepository,
    F: UploadRepository,
    S: FileStorage,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    /// The owning patient may always download; a doctor needs an active grant and the read
    /// is audited. Pharmacists never see reports.
    pub async fn execute(
        &self,
        user_id: UserId,
        role: UserRole,
        report_id: i64,
    ) -> Result<Download, RecordsServiceError> {
        let report = self
            .uploads
            .find_report(report_id)
            .await?
            .ok_or(RecordsServiceError::FileNotFound)?;
        let patient_id = report.patient_id;
        let mut reader = None;

        match role {
            UserRole::Patient => {
                let owner = self.users.patient_for_user(user_id).await?;
                if owner.is_none_or(|p| p.id != patient_id) {
                    return Err(RecordsServiceError::Forbidden);
                }
            }
            UserRole::Doctor => {
                let doctor = self
                    .users
                    .doctor_for_user(user_id)
                    .await?
                    .ok_or(RecordsServiceError::DoctorNotFound)?;
                self.gate
                    .require(&self.audit, doctor.id, patient_id, AuditAction::ReportDownload)
                    .await?;
                reader = Some(doctor.id);
            }
            UserRole::Pharmacist => return Err(RecordsServiceError::Forbidden),
        }

        let bytes = self
            .storage
            .load(&report.storage_key)
            .await?
            .ok_or(RecordsServiceError::FileNotFound)?;

        // Only a delivered file counts as a read.
        if let Some(doctor_id) = reader {
            let entry = self
                .audit
                .entry(
                    AuditAction::ReportDownload,
                    true,
                    AuditActors::doctor_on(doctor_id, patient_id),
                )
                .with_detail(report.file_name.clone());
            self.audit.record(entry).await?;
        }
        Ok(Download {
            file_name: report.file_name,
            bytes,
        })
    }
}

pub struct DownloadExternalUseCase<F, S>
where
    F: UploadRepository,
    S: FileStorage,
{
    pub uploads: F,
    pub storage: S,
}

impl<F, S> DownloadExternalUseCase<F, S>
where
    F: UploadRepository,
    S: FileStorage,
{
    /// Someone else's upload is indistinguishable from a missing one.
    pub async fn execute(
        &self,
        patient_id: PatientId,
        upload_id: i64,
    ) -> Result<Download, RecordsServiceError> {
        let upload = self
            .uploads
            .find_external(upload_id)
            .await?
            .filter(|u| u.patient_id == patient_id)
            .ok_or(RecordsServiceError::FileNotFound)?;
        let bytes = self
            .storage
            .load(&upload.storage_key)
            .await?
            .ok_or(RecordsServiceError::FileNotFound)?;
        Ok(Download {
            file_name: upload.file_name,
            bytes,
        })
    }
}
