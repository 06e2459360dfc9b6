use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::types::{AuditRecord, ExternalPrescription};
use crate::error::RecordsServiceError;
use crate::handlers::identity::PatientIdentity;
use crate::handlers::multipart::read_file_field;
use crate::handlers::views::{PatientResponse, PrescriptionResponse};
use crate::state::AppState;
use crate::usecase::patient::{AccessLogsUseCase, PatientHistoryUseCase, TimelineEvent};
use crate::usecase::upload::UploadExternalUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TimelineEventResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub status: String,
    pub doctor_name: Option<String>,
}

impl From<TimelineEvent> for TimelineEventResponse {
    fn from(e: TimelineEvent) -> Self {
        Self {
            kind: e.kind.as_str(),
            timestamp: e.timestamp,
            title: e.title,
            status: e.status,
            doctor_name: e.doctor_name,
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub patient: PatientResponse,
    pub prescriptions: Vec<PrescriptionResponse>,
    pub timeline: Vec<TimelineEventResponse>,
}

#[derive(Serialize)]
pub struct AccessLogResponse {
    pub id: i64,
    pub action: String,
    pub success: bool,
    pub detail: Option<String>,
    pub doctor_name: Option<String>,
    pub pharmacist_name: Option<String>,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms_opt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<AuditRecord> for AccessLogResponse {
    fn from(r: AuditRecord) -> Self {
        Self {
            id: r.id,
            action: r.action.to_string(),
            success: r.success,
            detail: r.detail,
            doctor_name: r.doctor_name,
            pharmacist_name: r.pharmacist_name,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Serialize)]
pub struct AccessLogsResponse {
    pub logs: Vec<AccessLogResponse>,
}

#[derive(Serialize)]
pub struct ExternalPrescriptionResponse {
    pub id: i64,
    pub file_name: String,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
}

impl From<ExternalPrescription> for ExternalPrescriptionResponse {
    fn from(e: ExternalPrescription) -> Self {
        Self {
            download_url: format!("/api/files/external/{}", e.id),
            id: e.id,
            file_name: e.file_name,
            uploaded_at: e.uploaded_at,
        }
    }
}

// ── GET /api/patient/history ─────────────────────────────────────────────────

pub async fn get_history(
    patient: PatientIdentity,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, RecordsServiceError> {
    let uc = PatientHistoryUseCase {
        prescriptions: state.prescription_repo(),
        uploads: state.upload_repo(),
    };
    let history = uc.execute(patient.patient.id).await?;
    Ok(Json(HistoryResponse {
        patient: patient.patient.into(),
        prescriptions: history.prescriptions.into_iter().map(Into::into).collect(),
        timeline: history.timeline.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /api/patient/access-logs ─────────────────────────────────────────────

pub async fn get_access_logs(
    patient: PatientIdentity,
    State(state): State<AppState>,
) -> Result<Json<AccessLogsResponse>, RecordsServiceError> {
    let uc = AccessLogsUseCase {
        audit: state.audit_log(),
    };
    let logs = uc.execute(patient.patient.id).await?;
    Ok(Json(AccessLogsResponse {
        logs: logs.into_iter().map(Into::into).collect(),
    }))
}

// ── POST /api/patient/external-prescriptions ─────────────────────────────────

pub async fn upload_external(
    patient: PatientIdentity,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ExternalPrescriptionResponse>), RecordsServiceError> {
    let upload = read_file_field(multipart).await?;
    let uc = UploadExternalUseCase {
        uploads: state.upload_repo(),
        storage: state.storage.clone(),
        clock: state.clock,
    };
    let stored = uc.execute(patient.patient.id, upload).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}
