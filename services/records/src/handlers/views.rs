//! JSON shapes shared by more than one route group.

use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use medgate_domain::id::{DoctorId, PatientId, PharmacistId};

use crate::domain::types::{
    Download, PatientProfile, PrescribedMedicine, PrescriptionDetail, Report,
};

#[derive(Serialize)]
pub struct PatientResponse {
    pub id: PatientId,
    pub full_name: String,
    pub mobile: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
}

impl From<PatientProfile> for PatientResponse {
    fn from(p: PatientProfile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            mobile: p.mobile,
            dob: p.dob,
            gender: p.gender,
            allergies: p.allergies,
            chronic_conditions: p.chronic_conditions,
        }
    }
}

#[derive(Serialize)]
pub struct PrescriptionResponse {
    pub id: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub doctor_registration_number: String,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub patient_mobile: String,
    pub medicines: Vec<PrescribedMedicine>,
    pub doctor_notes: Option<String>,
    pub digital_signature: Option<String>,
    pub status: String,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms_opt")]
    pub dispensed_at: Option<DateTime<Utc>>,
    pub pharmacist_id: Option<PharmacistId>,
    pub qr_payload: String,
}

impl From<PrescriptionDetail> for PrescriptionResponse {
    fn from(d: PrescriptionDetail) -> Self {
        let p = d.prescription;
        Self {
            id: p.id,
            doctor_id: p.doctor_id,
            doctor_name: d.doctor_name,
            doctor_registration_number: d.doctor_registration_number,
            patient_id: p.patient_id,
            patient_name: d.patient_name,
            patient_mobile: d.patient_mobile,
            medicines: p.medicines,
            doctor_notes: p.doctor_notes,
            digital_signature: p.digital_signature,
            status: p.status.to_string(),
            created_at: p.created_at,
            dispensed_at: p.dispensed_at,
            pharmacist_id: p.pharmacist_id,
            qr_payload: p.qr_payload,
        }
    }
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub id: i64,
    pub file_name: String,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
}

impl From<Report> for ReportResponse {
    fn from(r: Report) -> Self {
        Self {
            download_url: format!("/api/files/reports/{}", r.id),
            id: r.id,
            file_name: r.file_name,
            uploaded_at: r.uploaded_at,
        }
    }
}

/// Stream a stored file back as an attachment.
impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            self.file_name
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                ),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(self.bytes),
        )
            .into_response()
    }
}
