//! Bearer-session extractors.
//!
//! `CurrentUser` authenticates any role. The role-scoped extractors additionally refuse
//! other roles with `Forbidden` and load the caller's profile.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use medgate_auth_types::bearer::bearer_token;
use medgate_domain::id::UserId;
use medgate_domain::role::UserRole;

use medgate_core::clock::SystemClock;

use crate::domain::repository::UserRepository;
use crate::domain::types::{DoctorProfile, PatientProfile, PharmacistProfile};
use crate::error::RecordsServiceError;
use crate::infra::db::DbSessionRepository;
use crate::state::AppState;
use crate::usecase::session::SessionStore;

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub role: UserRole,
    /// The presented token, kept so logout can revoke it.
    pub token: String,
}

impl CurrentUser {
    async fn resolve(
        store: SessionStore<DbSessionRepository, SystemClock>,
        token: Option<String>,
    ) -> Result<Self, RecordsServiceError> {
        let session = store.authenticate(token.as_deref()).await?;
        Ok(Self {
            user_id: session.user_id,
            role: session.role,
            token: session.token,
        })
    }

    fn require_role(self, role: UserRole) -> Result<Self, RecordsServiceError> {
        if self.role == role {
            Ok(self)
        } else {
            Err(RecordsServiceError::Forbidden)
        }
    }
}

// axum-core 0.5 declares `fn -> impl Future + Send`. Every extractor here reads what it
// needs synchronously and returns an async block that owns its repositories.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = RecordsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let store = state.session_store();
        Self::resolve(store, token)
    }
}

/// A caller holding the doctor role, with their profile.
#[derive(Debug, Clone)]
pub struct DoctorIdentity {
    pub user: CurrentUser,
    pub doctor: DoctorProfile,
}

impl FromRequestParts<AppState> for DoctorIdentity {
    type Rejection = RecordsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let store = state.session_store();
        let users = state.user_repo();
        async move {
            let user = CurrentUser::resolve(store, token)
                .await?
                .require_role(UserRole::Doctor)?;
            let doctor = users
                .doctor_for_user(user.user_id)
                .await?
                .ok_or(RecordsServiceError::DoctorNotFound)?;
            Ok(Self { user, doctor })
        }
    }
}

/// A caller holding the pharmacist role, with their profile.
#[derive(Debug, Clone)]
pub struct PharmacistIdentity {
    pub user: CurrentUser,
    pub pharmacist: PharmacistProfile,
}

impl FromRequestParts<AppState> for PharmacistIdentity {
    type Rejection = RecordsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let store = state.session_store();
        let users = state.user_repo();
        async move {
            let user = CurrentUser::resolve(store, token)
                .await?
                .require_role(UserRole::Pharmacist)?;
            let pharmacist = users
                .pharmacist_for_user(user.user_id)
                .await?
                .ok_or(RecordsServiceError::PharmacistNotFound)?;
            Ok(Self { user, pharmacist })
        }
    }
}

/// A caller holding the patient role, with their profile.
#[derive(Debug, Clone)]
pub struct PatientIdentity {
    pub user: CurrentUser,
    pub patient: PatientProfile,
}

impl FromRequestParts<AppState> for PatientIdentity {
    type Rejection = RecordsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let store = state.session_store();
        let users = state.user_repo();
        async move {
            let user = CurrentUser::resolve(store, token)
                .await?
                .require_role(UserRole::Patient)?;
            let patient = users
                .patient_for_user(user.user_id)
                .await?
                .ok_or(RecordsServiceError::PatientNotFound)?;
            Ok(Self { user, patient })
        }
    }
}
