use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordsServiceError;
use crate::handlers::identity::PharmacistIdentity;
use crate::handlers::views::PrescriptionResponse;
use crate::state::AppState;
use crate::usecase::prescription::{DispensePrescriptionUseCase, LookupPrescriptionUseCase};

#[derive(Deserialize)]
pub struct LookupRequest {
    /// Prescription id or a scanned QR payload.
    #[serde(default)]
    pub value: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub prescription: PrescriptionResponse,
}

#[derive(Serialize)]
pub struct DispenseResponse {
    pub id: String,
    pub status: &'static str,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub dispensed_at: DateTime<Utc>,
}

// ── POST /api/pharmacist/prescriptions/lookup ────────────────────────────────

pub async fn lookup_prescription(
    _pharmacist: PharmacistIdentity,
    State(state): State<AppState>,
    Json(body): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, RecordsServiceError> {
    let uc = LookupPrescriptionUseCase {
        prescriptions: state.prescription_repo(),
    };
    let detail = uc.execute(&body.value).await?;
    Ok(Json(LookupResponse {
        prescription: detail.into(),
    }))
}

// ── POST /api/pharmacist/prescriptions/{id}/dispense ─────────────────────────

pub async fn dispense_prescription(
    pharmacist: PharmacistIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DispenseResponse>, RecordsServiceError> {
    let uc = DispensePrescriptionUseCase {
        prescriptions: state.prescription_repo(),
        audit: state.audit_log(),
    };
    let dispensed_at = uc.execute(pharmacist.pharmacist.id, &id).await?;
    Ok(Json(DispenseResponse {
        id,
        status: "dispensed",
        dispensed_at,
    }))
}
