use chrono::{DateTime, Utc};

use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId};

use crate::domain::repository::{
    AuditRepository, GrantRepository, PrescriptionRepository, UploadRepository, UserRepository,
};
use crate::domain::types::{AuditActors, AuditRecord, PatientProfile, PrescriptionDetail, Report};
use crate::error::RecordsServiceError;
use crate::usecase::access::AccessGate;
use crate::usecase::audit::AuditLog;

// ── Search ───────────────────────────────────────────────────────────────────

pub struct SearchPatientUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> SearchPatientUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(&self, mobile: &str) -> Result<PatientProfile, RecordsServiceError> {
        let mobile = mobile.trim();
        if mobile.is_empty() {
            return Err(RecordsServiceError::MissingData("mobile"));
        }
        self.users
            .find_patient_by_mobile(mobile)
            .await?
            .ok_or(RecordsServiceError::PatientNotFound)
    }
}

// ── Overview (gated read) ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PatientOverview {
    pub profile: PatientProfile,
    pub prescriptions: Vec<PrescriptionDetail>,
    pub reports: Vec<Report>,
}

pub struct PatientOverviewUseCase<U, P, F, G, A, C>
where
    U: UserRepository,
    P: PrescriptionRepository,
    F: UploadRepository,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub users: U,
    pub prescriptions: P,
    pub uploads: F,
    pub gate: AccessGate<G, C>,
    pub audit: AuditLog<A, C>,
}

impl<U, P, F, G, A, C> PatientOverviewUseCase<U, P, F, G, A, C>
where
    U: UserRepository,
    P: PrescriptionRepository,
    F: UploadRepository,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<PatientOverview, RecordsServiceError> {
        self.gate
            .require(&self.audit, doctor_id, patient_id, AuditAction::PatientOverview)
            .await?;

        let profile = self
            .users
            .find_patient(patient_id)
            .await?
            .ok_or(RecordsServiceError::PatientNotFound)?;
        let prescriptions = self.prescriptions.list_for_patient(patient_id).await?;
        let reports = self.uploads.list_reports(patient_id).await?;

        let entry = self
            .audit
            .entry(
                AuditAction::PatientOverview,
                true,
                AuditActors::doctor_on(doctor_id, patient_id),
            )
            .with_detail("Overview viewed");
        self.audit.record(entry).await?;

        Ok(PatientOverview {
            profile,
            prescriptions,
            reports,
        })
    }
}

// ── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Prescription,
    ExternalUpload,
    Report,
}

impl TimelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prescription => "prescription",
            Self::ExternalUpload => "external_upload",
            Self::Report => "report",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimelineEvent {
    pub kind: TimelineKind,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub status: String,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PatientHistory {
    pub prescriptions: Vec<PrescriptionDetail>,
    pub timeline: Vec<TimelineEvent>,
}

pub struct PatientHistoryUseCase<P, F>
where
    P: PrescriptionRepository,
    F: UploadRepository,
{
    pub prescriptions: P,
    pub uploads: F,
}

impl<P, F> PatientHistoryUseCase<P, F>
where
    P: PrescriptionRepository,
    F: UploadRepository,
{
    /// Prescriptions plus one merged timeline of everything on file, newest first.
    pub async fn execute(&self, patient_id: PatientId) -> Result<PatientHistory, RecordsServiceError> {
        let prescriptions = self.prescriptions.list_for_patient(patient_id).await?;
        let external = self.uploads.list_external(patient_id).await?;
        let reports = self.uploads.list_reports(patient_id).await?;

        let mut timeline: Vec<TimelineEvent> = prescriptions
            .iter()
            .map(|d| TimelineEvent {
                kind: TimelineKind::Prescription,
                timestamp: d.prescription.created_at,
                title: format!("Prescription {}", d.prescription.id),
                status: d.prescription.status.as_str().to_owned(),
                doctor_name: Some(d.doctor_name.clone()),
            })
            .chain(external.into_iter().map(|e| TimelineEvent {
                kind: TimelineKind::ExternalUpload,
                timestamp: e.uploaded_at,
                title: format!("External prescription uploaded: {}", e.file_name),
                status: "Uploaded".to_owned(),
                doctor_name: None,
            }))
            .chain(reports.into_iter().map(|r| TimelineEvent {
                kind: TimelineKind::Report,
                timestamp: r.uploaded_at,
                title: format!("Report uploaded: {}", r.file_name),
                status: "Uploaded".to_owned(),
                doctor_name: None,
            }))
            .collect();
        timeline.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(PatientHistory {
            prescriptions,
            timeline,
        })
    }
}

// ── Access logs ──────────────────────────────────────────────────────────────

pub struct AccessLogsUseCase<A, C>
where
    A: AuditRepository,
    C: Clock,
{
    pub audit: AuditLog<A, C>,
}

impl<A, C> AccessLogsUseCase<A, C>
where
    A: AuditRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AuditRecord>, RecordsServiceError> {
        self.audit.for_patient(patient_id).await
    }
}
