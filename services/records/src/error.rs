use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Records service error variants.
#[derive(Debug, thiserror::Error)]
pub enum RecordsServiceError {
    // Authentication
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid session")]
    InvalidSession,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid credentials")]
    InvalidCredentials,

    // Authorization
    #[error("forbidden")]
    Forbidden,
    #[error("access denied: verification required or expired")]
    AccessDenied,

    // Consent
    #[error("verification code not found")]
    CodeNotFound,
    #[error("verification code already used")]
    CodeAlreadyUsed,
    #[error("verification code expired")]
    CodeExpired,
    #[error("verification code mismatch")]
    CodeMismatch,

    // Lookups
    #[error("doctor not found")]
    DoctorNotFound,
    #[error("patient not found")]
    PatientNotFound,
    #[error("pharmacist not found")]
    PharmacistNotFound,
    #[error("prescription not found")]
    PrescriptionNotFound,
    #[error("file not found")]
    FileNotFound,

    // Validation
    #[error("missing required field: {0}")]
    MissingData(&'static str),
    #[error("invalid medicine id: {0}")]
    InvalidMedicine(i32),
    #[error("prescription is {0} and cannot be dispensed")]
    PrescriptionNotActive(String),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("email, mobile, license or registration number already exists")]
    AlreadyExists,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RecordsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidSession => "INVALID_SESSION",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::CodeNotFound => "CODE_NOT_FOUND",
            Self::CodeAlreadyUsed => "CODE_ALREADY_USED",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::CodeMismatch => "CODE_MISMATCH",
            Self::DoctorNotFound => "DOCTOR_NOT_FOUND",
            Self::PatientNotFound => "PATIENT_NOT_FOUND",
            Self::PharmacistNotFound => "PHARMACIST_NOT_FOUND",
            Self::PrescriptionNotFound => "PRESCRIPTION_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::MissingData(_) => "MISSING_DATA",
            Self::InvalidMedicine(_) => "INVALID_MEDICINE",
            Self::PrescriptionNotActive(_) => "PRESCRIPTION_NOT_ACTIVE",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken
            | Self::InvalidSession
            | Self::SessionExpired
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::CodeNotFound
            | Self::DoctorNotFound
            | Self::PatientNotFound
            | Self::PharmacistNotFound
            | Self::PrescriptionNotFound
            | Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::CodeAlreadyUsed
            | Self::CodeExpired
            | Self::CodeMismatch
            | Self::MissingData(_)
            | Self::InvalidMedicine(_)
            | Self::PrescriptionNotActive(_)
            | Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecordsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected outcomes and TraceLayer already records the status.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
