use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use medgate_core::clock::Clock;
use medgate_domain::id::{DoctorId, PatientId, PharmacistId, UserId};
use medgate_domain::role::UserRole;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::{
    DoctorProfile, PatientProfile, PharmacistProfile, Profile, Session, User,
};
use crate::error::RecordsServiceError;
use crate::usecase::session::SessionStore;

fn hash_password(password: &str) -> Result<String, RecordsServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| RecordsServiceError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, RecordsServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| RecordsServiceError::Internal(anyhow::anyhow!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Trimmed value, or `MissingData(field)` when absent or blank.
fn required(value: Option<String>, field: &'static str) -> Result<String, RecordsServiceError> {
    optional(value).ok_or(RecordsServiceError::MissingData(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub role: Option<UserRole>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    // doctor
    pub registration_number: Option<String>,
    pub specialization: Option<String>,
    // pharmacist
    pub license_number: Option<String>,
    pub pharmacy_name: Option<String>,
    // patient
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
}

pub struct RegisterUseCase<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: Clock,
{
    pub users: U,
    pub sessions: SessionStore<S, C>,
}

impl<U, S, C> RegisterUseCase<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: Clock,
{
    /// Create the account and its profile, then open a session for it.
    pub async fn execute(&self, input: RegisterInput) -> Result<Session, RecordsServiceError> {
        let role = input.role.ok_or(RecordsServiceError::MissingData("role"))?;
        let email = required(input.email, "email")?.to_lowercase();
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(RecordsServiceError::MissingData("password"))?;
        let full_name = required(input.full_name, "full_name")?;

        let user_id = UserId::generate();
        let profile = match role {
            UserRole::Doctor => Profile::Doctor(DoctorProfile {
                id: DoctorId::generate(),
                user_id,
                full_name,
                registration_number: required(input.registration_number, "registration_number")?,
                specialization: optional(input.specialization),
            }),
            UserRole::Pharmacist => Profile::Pharmacist(PharmacistProfile {
                id: PharmacistId::generate(),
                user_id,
                full_name,
                pharmacy_name: optional(input.pharmacy_name),
                license_number: required(input.license_number, "license_number")?,
            }),
            UserRole::Patient => Profile::Patient(PatientProfile {
                id: PatientId::generate(),
                user_id,
                full_name,
                mobile: required(input.mobile, "mobile")?,
                dob: optional(input.dob),
                gender: optional(input.gender),
                allergies: input.allergies,
                chronic_conditions: input.chronic_conditions,
            }),
        };

        let user = User {
            id: user_id,
            email,
            password_hash: hash_password(&password)?,
            role,
            created_at: self.sessions.clock.now(),
        };
        self.users.create_account(&user, &profile).await?;
        tracing::info!(user_id = %user.id, role = %role, "account registered");

        self.sessions.create(user.id, role).await
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<String>,
    pub license_number: Option<String>,
}

pub struct LoginUseCase<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: Clock,
{
    pub users: U,
    pub sessions: SessionStore<S, C>,
}

impl<U, S, C> LoginUseCase<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: Clock,
{
    /// Doctors must also present their registration number and pharmacists their license
    /// number; a wrong one is treated like a wrong password.
    pub async fn execute(&self, input: LoginInput) -> Result<(User, Session), RecordsServiceError> {
        let email = required(input.email, "email")?.to_lowercase();
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(RecordsServiceError::MissingData("password"))?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(RecordsServiceError::InvalidCredentials)?;
        if !verify_password(&password, &user.password_hash)? {
            return Err(RecordsServiceError::InvalidCredentials);
        }

        match user.role {
            UserRole::Doctor => {
                let presented = required(input.registration_number, "registration_number")?;
                let doctor = self.users.doctor_for_user(user.id).await?;
                if doctor.is_none_or(|d| d.registration_number != presented) {
                    return Err(RecordsServiceError::InvalidCredentials);
                }
            }
            UserRole::Pharmacist => {
                let presented = required(input.license_number, "license_number")?;
                let pharmacist = self.users.pharmacist_for_user(user.id).await?;
                if pharmacist.is_none_or(|p| p.license_number != presented) {
                    return Err(RecordsServiceError::InvalidCredentials);
                }
            }
            UserRole::Patient => {}
        }

        let session = self.sessions.create(user.id, user.role).await?;
        Ok((user, session))
    }
}

// ── Me ───────────────────────────────────────────────────────────────────────

pub struct GetAccountUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> GetAccountUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(
        &self,
        user_id: UserId,
    ) -> Result<(User, Option<Profile>), RecordsServiceError> {
        // Users are never deleted; a session pointing nowhere is as good as unknown.
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(RecordsServiceError::InvalidSession)?;
        let profile = match user.role {
            UserRole::Doctor => self.users.doctor_for_user(user_id).await?.map(Profile::Doctor),
            UserRole::Pharmacist => self
                .users
                .pharmacist_for_user(user_id)
                .await?
                .map(Profile::Pharmacist),
            UserRole::Patient => self.users.patient_for_user(user_id).await?.map(Profile::Patient),
        };
        Ok((user, profile))
    }
}
