use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use medgate_core::health::{healthz, readyz};
use medgate_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    account::{get_me, get_medicines, login, logout, register},
    doctor::{
        create_prescription, get_overview, issue_code, search_patient, upload_report, verify_code,
    },
    files::{download_external, download_report},
    patient::{get_access_logs, get_history, upload_external},
    pharmacist::{dispense_prescription, lookup_prescription},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Accounts
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/me", get(get_me))
        .route("/api/medicines", get(get_medicines))
        // Doctor
        .route("/api/doctor/patients/search", get(search_patient))
        .route("/api/doctor/access/code", post(issue_code))
        .route("/api/doctor/access/verify", post(verify_code))
        .route("/api/doctor/patients/{id}/overview", get(get_overview))
        .route("/api/doctor/patients/{id}/reports", post(upload_report))
        .route("/api/doctor/prescriptions", post(create_prescription))
        // Pharmacist
        .route("/api/pharmacist/prescriptions/lookup", post(lookup_prescription))
        .route(
            "/api/pharmacist/prescriptions/{id}/dispense",
            post(dispense_prescription),
        )
        // Patient
        .route("/api/patient/history", get(get_history))
        .route("/api/patient/access-logs", get(get_access_logs))
        .route("/api/patient/external-prescriptions", post(upload_external))
        // Files
        .route("/api/files/reports/{id}", get(download_report))
        .route("/api/files/external/{id}", get(download_external))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
