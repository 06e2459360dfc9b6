use axum::extract::{Path, State};

use crate::domain::types::Download;
use crate::error::RecordsServiceError;
use crate::handlers::identity::{CurrentUser, PatientIdentity};
use crate::state::AppState;
use crate::usecase::upload::{DownloadExternalUseCase, DownloadReportUseCase};

// ── GET /api/files/reports/{id} ──────────────────────────────────────────────

pub async fn download_report(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
) -> Result<Download, RecordsServiceError> {
    let uc = DownloadReportUseCase {
        users: state.user_repo(),
        uploads: state.upload_repo(),
        storage: state.storage.clone(),
        gate: state.access_gate(),
        audit: state.audit_log(),
    };
    uc.execute(current.user_id, current.role, report_id).await
}

// ── GET /api/files/external/{id} ─────────────────────────────────────────────

pub async fn download_external(
    patient: PatientIdentity,
    State(state): State<AppState>,
    Path(upload_id): Path<i64>,
) -> Result<Download, RecordsServiceError> {
    let uc = DownloadExternalUseCase {
        uploads: state.upload_repo(),
        storage: state.storage.clone(),
    };
    uc.execute(patient.patient.id, upload_id).await
}
