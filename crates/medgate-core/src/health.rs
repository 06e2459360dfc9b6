use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub service: &'static str,
}

/// Handler for `GET /healthz`: liveness check with a small JSON body for humans.
pub async fn healthz() -> (StatusCode, Json<HealthBody>) {
    (
        StatusCode::OK,
        Json(HealthBody {
            status: "ok",
            service: "medgate",
        }),
    )
}

/// Handler for `GET /readyz`. The service has no warm-up phase, so ready means running.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
