use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId, PharmacistId, UserId};
use medgate_domain::prescription::PrescriptionStatus;
use medgate_domain::role::UserRole;
use medgate_records_schema::{
    access_grants, audit_entries, doctors, external_prescriptions, medicines, patients,
    pharmacists, prescriptions, reports, sessions, users, verification_codes,
};

use crate::domain::repository::{
    AuditRepository, ConsentRepository, GrantRepository, MedicineRepository,
    PrescriptionRepository, SessionRepository, UploadRepository, UserRepository,
};
use crate::domain::types::{
    AccessGrant, AuditRecord, DoctorProfile, ExternalPrescription, Medicine, NewAccessGrant,
    NewAuditEntry, NewExternalPrescription, NewReport, NewVerificationCode, PatientProfile,
    PharmacistProfile, Prescription, PrescriptionDetail, Profile, Report, Session, User,
    VerificationCode,
};
use crate::error::RecordsServiceError;

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Insert an audit row on whatever connection the caller holds, usually the transaction
/// that carries the state change the entry documents.
async fn insert_audit_entry<C>(conn: &C, entry: &NewAuditEntry) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    audit_entries::ActiveModel {
        id: NotSet,
        doctor_id: Set(entry.actors.doctor_id.map(|id| id.0)),
        pharmacist_id: Set(entry.actors.pharmacist_id.map(|id| id.0)),
        patient_id: Set(entry.actors.patient_id.map(|id| id.0)),
        action: Set(entry.action.as_str().to_owned()),
        success: Set(entry.success),
        detail: Set(entry.detail.clone()),
        created_at: Set(entry.created_at),
        expires_at: Set(entry.expires_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn string_list(value: serde_json::Value, what: &'static str) -> anyhow::Result<Vec<String>> {
    serde_json::from_value(value).context(what)
}

// ── Users & profiles ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn create_account(
        &self,
        user: &User,
        profile: &Profile,
    ) -> Result<(), RecordsServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                let profile = profile.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id.0),
                        email: Set(user.email),
                        password_hash: Set(user.password_hash),
                        role: Set(user.role.as_str().to_owned()),
                        created_at: Set(user.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_profile(txn, &profile).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Connection(e) | TransactionError::Transaction(e))
                if is_unique_violation(&e) =>
            {
                Err(RecordsServiceError::AlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create account").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RecordsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RecordsServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn doctor_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<DoctorProfile>, RecordsServiceError> {
        let model = doctors::Entity::find()
            .filter(doctors::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .context("find doctor by user")?;
        Ok(model.map(doctor_from_model))
    }

    async fn pharmacist_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PharmacistProfile>, RecordsServiceError> {
        let model = pharmacists::Entity::find()
            .filter(pharmacists::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .context("find pharmacist by user")?;
        Ok(model.map(pharmacist_from_model))
    }

    async fn patient_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let model = patients::Entity::find()
            .filter(patients::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .context("find patient by user")?;
        Ok(model.map(patient_from_model).transpose()?)
    }

    async fn find_patient(
        &self,
        id: PatientId,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let model = patients::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find patient by id")?;
        Ok(model.map(patient_from_model).transpose()?)
    }

    async fn find_patient_by_mobile(
        &self,
        mobile: &str,
    ) -> Result<Option<PatientProfile>, RecordsServiceError> {
        let model = patients::Entity::find()
            .filter(patients::Column::Mobile.eq(mobile))
            .one(&self.db)
            .await
            .context("find patient by mobile")?;
        Ok(model.map(patient_from_model).transpose()?)
    }
}

async fn insert_profile<C>(conn: &C, profile: &Profile) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    match profile {
        Profile::Doctor(d) => {
            doctors::ActiveModel {
                id: Set(d.id.0),
                user_id: Set(d.user_id.0),
                full_name: Set(d.full_name.clone()),
                registration_number: Set(d.registration_number.clone()),
                specialization: Set(d.specialization.clone()),
            }
            .insert(conn)
            .await?;
        }
        Profile::Pharmacist(p) => {
            pharmacists::ActiveModel {
                id: Set(p.id.0),
                user_id: Set(p.user_id.0),
                full_name: Set(p.full_name.clone()),
                pharmacy_name: Set(p.pharmacy_name.clone()),
                license_number: Set(p.license_number.clone()),
            }
            .insert(conn)
            .await?;
        }
        Profile::Patient(p) => {
            patients::ActiveModel {
                id: Set(p.id.0),
                user_id: Set(p.user_id.0),
                full_name: Set(p.full_name.clone()),
                mobile: Set(p.mobile.clone()),
                dob: Set(p.dob.clone()),
                gender: Set(p.gender.clone()),
                allergies: Set(serde_json::Value::from(p.allergies.clone())),
                chronic_conditions: Set(serde_json::Value::from(p.chronic_conditions.clone())),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

fn user_from_model(model: users::Model) -> Result<User, RecordsServiceError> {
    Ok(User {
        id: UserId(model.id),
        email: model.email,
        password_hash: model.password_hash,
        role: model.role.parse::<UserRole>().context("stored user role")?,
        created_at: model.created_at,
    })
}

fn doctor_from_model(model: doctors::Model) -> DoctorProfile {
    DoctorProfile {
        id: DoctorId(model.id),
        user_id: UserId(model.user_id),
        full_name: model.full_name,
        registration_number: model.registration_number,
        specialization: model.specialization,
    }
}

fn pharmacist_from_model(model: pharmacists::Model) -> PharmacistProfile {
    PharmacistProfile {
        id: PharmacistId(model.id),
        user_id: UserId(model.user_id),
        full_name: model.full_name,
        pharmacy_name: model.pharmacy_name,
        license_number: model.license_number,
    }
}

fn patient_from_model(model: patients::Model) -> anyhow::Result<PatientProfile> {
    Ok(PatientProfile {
        id: PatientId(model.id),
        user_id: UserId(model.user_id),
        full_name: model.full_name,
        mobile: model.mobile,
        dob: model.dob,
        gender: model.gender,
        allergies: string_list(model.allergies, "patient allergies")?,
        chronic_conditions: string_list(model.chronic_conditions, "patient chronic conditions")?,
    })
}

// ── Sessions ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), RecordsServiceError> {
        sessions::ActiveModel {
            token: Set(session.token.clone()),
            user_id: Set(session.user_id.0),
            role: Set(session.role.as_str().to_owned()),
            created_at: Set(session.created_at),
            expires_at: Set(session.expires_at),
        }
        .insert(&self.db)
        .await
        .context("create session")?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, RecordsServiceError> {
        let model = sessions::Entity::find_by_id(token.to_owned())
            .one(&self.db)
            .await
            .context("find session")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(Some(Session {
            token: model.token,
            user_id: UserId(model.user_id),
            role: model.role.parse::<UserRole>().context("stored session role")?,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }))
    }

    async fn delete(&self, token: &str) -> Result<(), RecordsServiceError> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .context("delete session")?;
        Ok(())
    }
}

// ── Consent: codes and grants ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbConsentRepository {
    pub db: DatabaseConnection,
}

impl ConsentRepository for DbConsentRepository {
    async fn create_code(
        &self,
        code: &NewVerificationCode,
        audit: &NewAuditEntry,
    ) -> Result<VerificationCode, RecordsServiceError> {
        let model = self
            .db
            .transaction::<_, verification_codes::Model, DbErr>(|txn| {
                let code = code.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    let model = verification_codes::ActiveModel {
                        id: NotSet,
                        doctor_id: Set(code.doctor_id.0),
                        patient_id: Set(code.patient_id.0),
                        code: Set(code.code),
                        created_at: Set(code.created_at),
                        expires_at: Set(code.expires_at),
                        verified_at: Set(None),
                    }
                    .insert(txn)
                    .await?;
                    insert_audit_entry(txn, &audit).await?;
                    Ok(model)
                })
            })
            .await
            .context("create verification code")?;
        Ok(code_from_model(model))
    }

    async fn latest_code(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<VerificationCode>, RecordsServiceError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::DoctorId.eq(doctor_id.0))
            .filter(verification_codes::Column::PatientId.eq(patient_id.0))
            .order_by_desc(verification_codes::Column::CreatedAt)
            .order_by_desc(verification_codes::Column::Id)
            .one(&self.db)
            .await
            .context("find latest verification code")?;
        Ok(model.map(code_from_model))
    }

    async fn verify_and_grant(
        &self,
        verified_at: DateTime<Utc>,
        grant: &NewAccessGrant,
        audit: &NewAuditEntry,
    ) -> Result<Option<AccessGrant>, RecordsServiceError> {
        let model = self
            .db
            .transaction::<_, Option<access_grants::Model>, DbErr>(|txn| {
                let grant = grant.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    let claimed = verification_codes::Entity::update_many()
                        .col_expr(
                            verification_codes::Column::VerifiedAt,
                            Expr::value(verified_at),
                        )
                        .filter(verification_codes::Column::Id.eq(grant.code_id))
                        .filter(verification_codes::Column::VerifiedAt.is_null())
                        .exec(txn)
                        .await?;
                    if claimed.rows_affected == 0 {
                        return Ok(None);
                    }

                    let model = access_grants::ActiveModel {
                        id: NotSet,
                        doctor_id: Set(grant.doctor_id.0),
                        patient_id: Set(grant.patient_id.0),
                        code_id: Set(grant.code_id),
                        granted_at: Set(grant.granted_at),
                        expires_at: Set(grant.expires_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_audit_entry(txn, &audit).await?;
                    Ok(Some(model))
                })
            })
            .await
            .context("verify code and grant access")?;
        Ok(model.map(grant_from_model))
    }
}

impl GrantRepository for DbConsentRepository {
    async fn latest_grant(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Option<AccessGrant>, RecordsServiceError> {
        let model = access_grants::Entity::find()
            .filter(access_grants::Column::DoctorId.eq(doctor_id.0))
            .filter(access_grants::Column::PatientId.eq(patient_id.0))
            .order_by_desc(access_grants::Column::GrantedAt)
            .order_by_desc(access_grants::Column::Id)
            .one(&self.db)
            .await
            .context("find latest access grant")?;
        Ok(model.map(grant_from_model))
    }
}

fn code_from_model(model: verification_codes::Model) -> VerificationCode {
    VerificationCode {
        id: model.id,
        doctor_id: DoctorId(model.doctor_id),
        patient_id: PatientId(model.patient_id),
        code: model.code,
        created_at: model.created_at,
        expires_at: model.expires_at,
        verified_at: model.verified_at,
    }
}

fn grant_from_model(model: access_grants::Model) -> AccessGrant {
    AccessGrant {
        id: model.id,
        doctor_id: DoctorId(model.doctor_id),
        patient_id: PatientId(model.patient_id),
        code_id: model.code_id,
        granted_at: model.granted_at,
        expires_at: model.expires_at,
    }
}

// ── Audit ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditRepository {
    pub db: DatabaseConnection,
}

impl AuditRepository for DbAuditRepository {
    async fn append(&self, entry: &NewAuditEntry) -> Result<(), RecordsServiceError> {
        insert_audit_entry(&self.db, entry)
            .await
            .context("append audit entry")?;
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AuditRecord>, RecordsServiceError> {
        let models = audit_entries::Entity::find()
            .filter(audit_entries::Column::PatientId.eq(patient_id.0))
            .order_by_desc(audit_entries::Column::CreatedAt)
            .order_by_desc(audit_entries::Column::Id)
            .all(&self.db)
            .await
            .context("list audit entries for patient")?;

        let doctor_ids: Vec<Uuid> = models.iter().filter_map(|m| m.doctor_id).collect();
        let pharmacist_ids: Vec<Uuid> = models.iter().filter_map(|m| m.pharmacist_id).collect();

        let doctor_names: HashMap<Uuid, String> = doctors::Entity::find()
            .filter(doctors::Column::Id.is_in(doctor_ids))
            .all(&self.db)
            .await
            .context("resolve audit doctor names")?
            .into_iter()
            .map(|d| (d.id, d.full_name))
            .collect();
        let pharmacist_names: HashMap<Uuid, String> = pharmacists::Entity::find()
            .filter(pharmacists::Column::Id.is_in(pharmacist_ids))
            .all(&self.db)
            .await
            .context("resolve audit pharmacist names")?
            .into_iter()
            .map(|p| (p.id, p.full_name))
            .collect();

        models
            .into_iter()
            .map(|m| {
                Ok(AuditRecord {
                    id: m.id,
                    action: m.action.parse::<AuditAction>().context("stored audit action")?,
                    success: m.success,
                    detail: m.detail,
                    doctor_name: m.doctor_id.and_then(|id| doctor_names.get(&id).cloned()),
                    pharmacist_name: m
                        .pharmacist_id
                        .and_then(|id| pharmacist_names.get(&id).cloned()),
                    created_at: m.created_at,
                    expires_at: m.expires_at,
                })
            })
            .collect()
    }
}

// ── Medicine catalog ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMedicineRepository {
    pub db: DatabaseConnection,
}

impl MedicineRepository for DbMedicineRepository {
    async fn list_all(&self) -> Result<Vec<Medicine>, RecordsServiceError> {
        let models = medicines::Entity::find()
            .order_by_asc(medicines::Column::BrandName)
            .all(&self.db)
            .await
            .context("list medicines")?;
        Ok(models
            .into_iter()
            .map(|m| Medicine {
                id: m.id,
                brand_name: m.brand_name,
                generic_name: m.generic_name,
                indications: m.indications,
                standard_dosage: m.standard_dosage,
                precautions: m.precautions,
            })
            .collect())
    }
}

// ── Prescriptions ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPrescriptionRepository {
    pub db: DatabaseConnection,
}

impl DbPrescriptionRepository {
    /// Join doctor and patient names onto prescription rows with two batched lookups.
    async fn with_details(
        &self,
        models: Vec<prescriptions::Model>,
    ) -> Result<Vec<PrescriptionDetail>, RecordsServiceError> {
        let doctor_ids: Vec<Uuid> = models.iter().map(|m| m.doctor_id).collect();
        let patient_ids: Vec<Uuid> = models.iter().map(|m| m.patient_id).collect();

        let doctor_rows: HashMap<Uuid, doctors::Model> = doctors::Entity::find()
            .filter(doctors::Column::Id.is_in(doctor_ids))
            .all(&self.db)
            .await
            .context("load prescribing doctors")?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        let patient_rows: HashMap<Uuid, patients::Model> = patients::Entity::find()
            .filter(patients::Column::Id.is_in(patient_ids))
            .all(&self.db)
            .await
            .context("load prescription patients")?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        models
            .into_iter()
            .map(|m| {
                let doctor = doctor_rows
                    .get(&m.doctor_id)
                    .with_context(|| format!("doctor missing for prescription {}", m.id))?;
                let patient = patient_rows
                    .get(&m.patient_id)
                    .with_context(|| format!("patient missing for prescription {}", m.id))?;
                Ok(PrescriptionDetail {
                    doctor_name: doctor.full_name.clone(),
                    doctor_registration_number: doctor.registration_number.clone(),
                    patient_name: patient.full_name.clone(),
                    patient_mobile: patient.mobile.clone(),
                    prescription: prescription_from_model(m)?,
                })
            })
            .collect()
    }
}

impl PrescriptionRepository for DbPrescriptionRepository {
    async fn create(
        &self,
        prescription: &Prescription,
        audit: &NewAuditEntry,
    ) -> Result<(), RecordsServiceError> {
        let medicines =
            serde_json::to_value(&prescription.medicines).context("encode prescription medicines")?;
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let p = prescription.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    prescriptions::ActiveModel {
                        id: Set(p.id),
                        doctor_id: Set(p.doctor_id.0),
                        patient_id: Set(p.patient_id.0),
                        medicines: Set(medicines),
                        doctor_notes: Set(p.doctor_notes),
                        digital_signature: Set(p.digital_signature),
                        status: Set(p.status.as_str().to_owned()),
                        created_at: Set(p.created_at),
                        dispensed_at: Set(p.dispensed_at),
                        pharmacist_id: Set(p.pharmacist_id.map(|id| id.0)),
                        qr_payload: Set(p.qr_payload),
                    }
                    .insert(txn)
                    .await?;
                    insert_audit_entry(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("create prescription")?;
        Ok(())
    }

    async fn find_detail(
        &self,
        id: &str,
    ) -> Result<Option<PrescriptionDetail>, RecordsServiceError> {
        let model = prescriptions::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find prescription")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.with_details(vec![model]).await?.pop())
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<PrescriptionDetail>, RecordsServiceError> {
        let models = prescriptions::Entity::find()
            .filter(prescriptions::Column::PatientId.eq(patient_id.0))
            .order_by_desc(prescriptions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list prescriptions for patient")?;
        self.with_details(models).await
    }

    async fn dispense(
        &self,
        id: &str,
        pharmacist_id: PharmacistId,
        dispensed_at: DateTime<Utc>,
        audit: &NewAuditEntry,
    ) -> Result<bool, RecordsServiceError> {
        let dispensed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let id = id.to_owned();
                let audit = audit.clone();
                Box::pin(async move {
                    let closed = prescriptions::Entity::update_many()
                        .col_expr(
                            prescriptions::Column::Status,
                            Expr::value(PrescriptionStatus::Expired.as_str()),
                        )
                        .col_expr(prescriptions::Column::DispensedAt, Expr::value(dispensed_at))
                        .col_expr(
                            prescriptions::Column::PharmacistId,
                            Expr::value(pharmacist_id.0),
                        )
                        .filter(prescriptions::Column::Id.eq(id))
                        .filter(prescriptions::Column::Status.eq(PrescriptionStatus::Active.as_str()))
                        .exec(txn)
                        .await?;
                    if closed.rows_affected == 0 {
                        return Ok(false);
                    }
                    insert_audit_entry(txn, &audit).await?;
                    Ok(true)
                })
            })
            .await
            .context("dispense prescription")?;
        Ok(dispensed)
    }
}

fn prescription_from_model(model: prescriptions::Model) -> anyhow::Result<Prescription> {
    Ok(Prescription {
        medicines: serde_json::from_value(model.medicines).context("prescription medicines")?,
        status: model.status.parse::<PrescriptionStatus>().context("stored prescription status")?,
        id: model.id,
        doctor_id: DoctorId(model.doctor_id),
        patient_id: PatientId(model.patient_id),
        doctor_notes: model.doctor_notes,
        digital_signature: model.digital_signature,
        created_at: model.created_at,
        dispensed_at: model.dispensed_at,
        pharmacist_id: model.pharmacist_id.map(PharmacistId),
        qr_payload: model.qr_payload,
    })
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUploadRepository {
    pub db: DatabaseConnection,
}

impl UploadRepository for DbUploadRepository {
    async fn create_report(
        &self,
        report: &NewReport,
        audit: &NewAuditEntry,
    ) -> Result<Report, RecordsServiceError> {
        let model = self
            .db
            .transaction::<_, reports::Model, DbErr>(|txn| {
                let report = report.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    let model = reports::ActiveModel {
                        id: NotSet,
                        patient_id: Set(report.patient_id.0),
                        uploader_user_id: Set(report.uploader_user_id.0),
                        file_name: Set(report.file_name),
                        storage_key: Set(report.storage_key),
                        uploaded_at: Set(report.uploaded_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_audit_entry(txn, &audit).await?;
                    Ok(model)
                })
            })
            .await
            .context("create report")?;
        Ok(report_from_model(model))
    }

    async fn find_report(&self, id: i64) -> Result<Option<Report>, RecordsServiceError> {
        let model = reports::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find report")?;
        Ok(model.map(report_from_model))
    }

    async fn list_reports(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Report>, RecordsServiceError> {
        let models = reports::Entity::find()
            .filter(reports::Column::PatientId.eq(patient_id.0))
            .order_by_desc(reports::Column::UploadedAt)
            .all(&self.db)
            .await
            .context("list reports")?;
        Ok(models.into_iter().map(report_from_model).collect())
    }

    async fn create_external(
        &self,
        upload: &NewExternalPrescription,
    ) -> Result<ExternalPrescription, RecordsServiceError> {
        let model = external_prescriptions::ActiveModel {
            id: NotSet,
            patient_id: Set(upload.patient_id.0),
            file_name: Set(upload.file_name.clone()),
            storage_key: Set(upload.storage_key.clone()),
            uploaded_at: Set(upload.uploaded_at),
        }
        .insert(&self.db)
        .await
        .context("create external prescription")?;
        Ok(external_from_model(model))
    }

    async fn find_external(
        &self,
        id: i64,
    ) -> Result<Option<ExternalPrescription>, RecordsServiceError> {
        let model = external_prescriptions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find external prescription")?;
        Ok(model.map(external_from_model))
    }

    async fn list_external(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ExternalPrescription>, RecordsServiceError> {
        let models = external_prescriptions::Entity::find()
            .filter(external_prescriptions::Column::PatientId.eq(patient_id.0))
            .order_by_desc(external_prescriptions::Column::UploadedAt)
            .all(&self.db)
            .await
            .context("list external prescriptions")?;
        Ok(models.into_iter().map(external_from_model).collect())
    }
}

fn report_from_model(model: reports::Model) -> Report {
    Report {
        id: model.id,
        patient_id: PatientId(model.patient_id),
        uploader_user_id: UserId(model.uploader_user_id),
        file_name: model.file_name,
        storage_key: model.storage_key,
        uploaded_at: model.uploaded_at,
    }
}

fn external_from_model(model: external_prescriptions::Model) -> ExternalPrescription {
    ExternalPrescription {
        id: model.id,
        patient_id: PatientId(model.patient_id),
        file_name: model.file_name,
        storage_key: model.storage_key,
        uploaded_at: model.uploaded_at,
    }
}
