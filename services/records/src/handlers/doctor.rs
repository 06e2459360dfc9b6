use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medgate_auth_types::code::ACCESS_WINDOW_MINUTES;
use medgate_domain::id::PatientId;

use crate::domain::types::Prescription;
use crate::error::RecordsServiceError;
use crate::handlers::identity::DoctorIdentity;
use crate::handlers::multipart::read_file_field;
use crate::handlers::views::{PatientResponse, PrescriptionResponse, ReportResponse};
use crate::state::AppState;
use crate::usecase::patient::{PatientOverviewUseCase, SearchPatientUseCase};
use crate::usecase::prescription::{
    CreatePrescriptionInput, CreatePrescriptionUseCase, MedicineLine,
};
use crate::usecase::upload::UploadReportUseCase;

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub mobile: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub patient: PatientResponse,
}

#[derive(Deserialize)]
pub struct IssueCodeRequest {
    pub patient_id: PatientId,
}

#[derive(Serialize)]
pub struct IssueCodeResponse {
    pub code: String,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub valid_for_minutes: i64,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub patient_id: PatientId,
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub access_expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub patient: PatientResponse,
    pub prescriptions: Vec<PrescriptionResponse>,
    pub reports: Vec<ReportResponse>,
}

#[derive(Deserialize)]
pub struct MedicineLineRequest {
    pub medicine_id: i32,
    pub dosage: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: PatientId,
    #[serde(default)]
    pub medicines: Vec<MedicineLineRequest>,
    pub doctor_notes: Option<String>,
    pub digital_signature: Option<String>,
}

#[derive(Serialize)]
pub struct CreatePrescriptionResponse {
    pub id: String,
    pub status: String,
    pub qr_payload: String,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Prescription> for CreatePrescriptionResponse {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            status: p.status.to_string(),
            qr_payload: p.qr_payload,
            created_at: p.created_at,
        }
    }
}

// ── GET /api/doctor/patients/search ──────────────────────────────────────────

pub async fn search_patient(
    _doctor: DoctorIdentity,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, RecordsServiceError> {
    let uc = SearchPatientUseCase {
        users: state.user_repo(),
    };
    let patient = uc.execute(&query.mobile).await?;
    Ok(Json(SearchResponse {
        patient: patient.into(),
    }))
}

// ── POST /api/doctor/access/code ─────────────────────────────────────────────

pub async fn issue_code(
    doctor: DoctorIdentity,
    State(state): State<AppState>,
    Json(body): Json<IssueCodeRequest>,
) -> Result<(StatusCode, Json<IssueCodeResponse>), RecordsServiceError> {
    let issued = state
        .consent_ledger()
        .issue_code(doctor.doctor.id, body.patient_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(IssueCodeResponse {
            code: issued.code,
            expires_at: issued.expires_at,
            valid_for_minutes: ACCESS_WINDOW_MINUTES,
        }),
    ))
}

// ── POST /api/doctor/access/verify ───────────────────────────────────────────

pub async fn verify_code(
    doctor: DoctorIdentity,
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, RecordsServiceError> {
    let grant = state
        .consent_ledger()
        .verify_code(doctor.doctor.id, body.patient_id, &body.code)
        .await?;
    Ok(Json(VerifyCodeResponse {
        access_expires_at: grant.expires_at,
    }))
}

// ── GET /api/doctor/patients/{id}/overview ───────────────────────────────────

pub async fn get_overview(
    doctor: DoctorIdentity,
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<OverviewResponse>, RecordsServiceError> {
    let uc = PatientOverviewUseCase {
        users: state.user_repo(),
        prescriptions: state.prescription_repo(),
        uploads: state.upload_repo(),
        gate: state.access_gate(),
        audit: state.audit_log(),
    };
    let overview = uc.execute(doctor.doctor.id, patient_id).await?;
    Ok(Json(OverviewResponse {
        patient: overview.profile.into(),
        prescriptions: overview.prescriptions.into_iter().map(Into::into).collect(),
        reports: overview.reports.into_iter().map(Into::into).collect(),
    }))
}

// ── POST /api/doctor/patients/{id}/reports ───────────────────────────────────

pub async fn upload_report(
    doctor: DoctorIdentity,
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ReportResponse>), RecordsServiceError> {
    let upload = read_file_field(multipart).await?;
    let uc = UploadReportUseCase {
        users: state.user_repo(),
        uploads: state.upload_repo(),
        storage: state.storage.clone(),
        gate: state.access_gate(),
        audit: state.audit_log(),
    };
    let report = uc
        .execute(doctor.doctor.id, doctor.user.user_id, patient_id, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

// ── POST /api/doctor/prescriptions ───────────────────────────────────────────

pub async fn create_prescription(
    doctor: DoctorIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<CreatePrescriptionResponse>), RecordsServiceError> {
    let uc = CreatePrescriptionUseCase {
        users: state.user_repo(),
        medicines: state.medicine_repo(),
        prescriptions: state.prescription_repo(),
        gate: state.access_gate(),
        audit: state.audit_log(),
    };
    let input = CreatePrescriptionInput {
        patient_id: body.patient_id,
        medicines: body
            .medicines
            .into_iter()
            .map(|m| MedicineLine {
                medicine_id: m.medicine_id,
                dosage: m.dosage,
            })
            .collect(),
        doctor_notes: body.doctor_notes,
        digital_signature: body.digital_signature,
    };
    let prescription = uc.execute(doctor.doctor.id, input).await?;
    Ok((StatusCode::CREATED, Json(prescription.into())))
}
