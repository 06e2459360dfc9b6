use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medgate_domain::id::{DoctorId, PharmacistId, UserId};
use medgate_domain::role::UserRole;

use crate::domain::types::{Medicine, Profile, Session, User};
use crate::error::RecordsServiceError;
use crate::handlers::identity::CurrentUser;
use crate::handlers::views::PatientResponse;
use crate::state::AppState;
use crate::usecase::account::{
    GetAccountUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};
use crate::usecase::prescription::ListMedicinesUseCase;

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub role: Option<UserRole>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub registration_number: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub pharmacy_name: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(r: RegisterRequest) -> Self {
        Self {
            role: r.role,
            email: r.email,
            password: r.password,
            full_name: r.full_name,
            registration_number: r.registration_number,
            specialization: r.specialization,
            license_number: r.license_number,
            pharmacy_name: r.pharmacy_name,
            mobile: r.mobile,
            dob: r.dob,
            gender: r.gender,
            allergies: r.allergies,
            chronic_conditions: r.chronic_conditions,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub role: UserRole,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub session_expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl From<Session> for SessionResponse {
    fn from(s: Session) -> Self {
        Self {
            token: s.token,
            role: s.role,
            session_expires_at: s.expires_at,
            user: None,
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    #[serde(serialize_with = "medgate_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileResponse {
    Doctor {
        id: DoctorId,
        full_name: String,
        registration_number: String,
        specialization: Option<String>,
    },
    Pharmacist {
        id: PharmacistId,
        full_name: String,
        pharmacy_name: Option<String>,
        license_number: String,
    },
    Patient(PatientResponse),
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Doctor(d) => Self::Doctor {
                id: d.id,
                full_name: d.full_name,
                registration_number: d.registration_number,
                specialization: d.specialization,
            },
            Profile::Pharmacist(p) => Self::Pharmacist {
                id: p.id,
                full_name: p.full_name,
                pharmacy_name: p.pharmacy_name,
                license_number: p.license_number,
            },
            Profile::Patient(p) => Self::Patient(p.into()),
        }
    }
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
}

#[derive(Serialize)]
pub struct MedicinesResponse {
    pub medicines: Vec<Medicine>,
}

// ── POST /api/register ───────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), RecordsServiceError> {
    let uc = RegisterUseCase {
        users: state.user_repo(),
        sessions: state.session_store(),
    };
    let session = uc.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── POST /api/login ──────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, RecordsServiceError> {
    let uc = LoginUseCase {
        users: state.user_repo(),
        sessions: state.session_store(),
    };
    let (user, session) = uc
        .execute(LoginInput {
            email: body.email,
            password: body.password,
            registration_number: body.registration_number,
            license_number: body.license_number,
        })
        .await?;
    let mut response = SessionResponse::from(session);
    response.user = Some(user.into());
    Ok(Json(response))
}

// ── POST /api/logout ─────────────────────────────────────────────────────────

pub async fn logout(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, RecordsServiceError> {
    state.session_store().revoke(&current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/me ──────────────────────────────────────────────────────────────

pub async fn get_me(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, RecordsServiceError> {
    let uc = GetAccountUseCase {
        users: state.user_repo(),
    };
    let (user, profile) = uc.execute(current.user_id).await?;
    Ok(Json(MeResponse {
        user: user.into(),
        profile: profile.map(ProfileResponse::from),
    }))
}

// ── GET /api/medicines ───────────────────────────────────────────────────────

pub async fn get_medicines(
    _current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MedicinesResponse>, RecordsServiceError> {
    let uc = ListMedicinesUseCase {
        medicines: state.medicine_repo(),
    };
    let medicines = uc.execute().await?;
    Ok(Json(MedicinesResponse { medicines }))
}
