use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::RngExt;

use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::{DoctorId, PatientId, PharmacistId};
use medgate_domain::prescription::PrescriptionStatus;

use crate::domain::repository::{
    AuditRepository, GrantRepository, MedicineRepository, PrescriptionRepository, UserRepository,
};
use crate::domain::types::{
    AuditActors, Medicine, NewAuditEntry, PrescribedMedicine, Prescription, PrescriptionDetail,
    QR_PREFIX,
};
use crate::error::RecordsServiceError;
use crate::usecase::access::AccessGate;
use crate::usecase::audit::AuditLog;

/// `RX-<yyyymmddHHMMSS>-<4 hex digits>`, timestamp in UTC.
pub fn generate_prescription_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random();
    format!("RX-{}-{suffix:04X}", now.format("%Y%m%d%H%M%S"))
}

/// Accept either a bare prescription id or a scanned `MEDGATE:<id>` payload.
pub fn parse_lookup_value(value: &str) -> Option<&str> {
    let value = value.trim();
    let id = value.strip_prefix(QR_PREFIX).unwrap_or(value).trim();
    (!id.is_empty()).then_some(id)
}

// ── Catalog ──────────────────────────────────────────────────────────────────

pub struct ListMedicinesUseCase<M>
where
    M: MedicineRepository,
{
    pub medicines: M,
}

impl<M> ListMedicinesUseCase<M>
where
    M: MedicineRepository,
{
    pub async fn execute(&self) -> Result<Vec<Medicine>, RecordsServiceError> {
        self.medicines.list_all().await
    }
}

// ── Create (gated write) ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MedicineLine {
    pub medicine_id: i32,
    pub dosage: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePrescriptionInput {
    pub patient_id: PatientId,
    pub medicines: Vec<MedicineLine>,
    pub doctor_notes: Option<String>,
    pub digital_signature: Option<String>,
}

pub struct CreatePrescriptionUseCase<U, M, P, G, A, C>
where
    U: UserRepository,
    M: MedicineRepository,
    P: PrescriptionRepository,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub users: U,
    pub medicines: M,
    pub prescriptions: P,
    pub gate: AccessGate<G, C>,
    pub audit: AuditLog<A, C>,
}

impl<U, M, P, G, A, C> CreatePrescriptionUseCase<U, M, P, G, A, C>
where
    U: UserRepository,
    M: MedicineRepository,
    P: PrescriptionRepository,
    G: GrantRepository,
    A: AuditRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        doctor_id: DoctorId,
        input: CreatePrescriptionInput,
    ) -> Result<Prescription, RecordsServiceError> {
        if input.medicines.is_empty() {
            return Err(RecordsServiceError::MissingData("medicines"));
        }
        let patient_id = input.patient_id;

        self.gate
            .require(&self.audit, doctor_id, patient_id, AuditAction::PrescriptionCreate)
            .await?;

        self.users
            .find_patient(patient_id)
            .await?
            .ok_or(RecordsServiceError::PatientNotFound)?;

        let catalog: HashMap<i32, Medicine> = self
            .medicines
            .list_all()
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let medicines = input
            .medicines
            .iter()
            .map(|line| {
                catalog
                    .get(&line.medicine_id)
                    .map(|m| PrescribedMedicine::from_catalog(m, line.dosage.as_deref()))
                    .ok_or(RecordsServiceError::InvalidMedicine(line.medicine_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let now = self.audit.clock.now();
        let id = generate_prescription_id(now);
        let prescription = Prescription {
            qr_payload: format!("{QR_PREFIX}{id}"),
            id,
            doctor_id,
            patient_id,
            medicines,
            doctor_notes: input.doctor_notes,
            digital_signature: input.digital_signature,
            status: PrescriptionStatus::Active,
            created_at: now,
            dispensed_at: None,
            pharmacist_id: None,
        };
        let audit = NewAuditEntry::new(
            AuditAction::PrescriptionCreate,
            true,
            AuditActors::doctor_on(doctor_id, patient_id),
            now,
        )
        .with_detail(prescription.id.clone());

        self.prescriptions.create(&prescription, &audit).await?;
        tracing::info!(%doctor_id, %patient_id, prescription_id = %prescription.id, "prescription created");
        Ok(prescription)
    }
}

// ── Pharmacist lookup ────────────────────────────────────────────────────────

pub struct LookupPrescriptionUseCase<P>
where
    P: PrescriptionRepository,
{
    pub prescriptions: P,
}

impl<P> LookupPrescriptionUseCase<P>
where
    P: PrescriptionRepository,
{
    pub async fn execute(&self, value: &str) -> Result<PrescriptionDetail, RecordsServiceError> {
        let id = parse_lookup_value(value).ok_or(RecordsServiceError::MissingData("value"))?;
        self.prescriptions
            .find_detail(id)
            .await?
            .ok_or(RecordsServiceError::PrescriptionNotFound)
    }
}

// ── Dispense ─────────────────────────────────────────────────────────────────

pub struct DispensePrescriptionUseCase<P, A, C>
where
    P: PrescriptionRepository,
    A: AuditRepository,
    C: Clock,
{
    pub prescriptions: P,
    pub audit: AuditLog<A, C>,
}

impl<P, A, C> DispensePrescriptionUseCase<P, A, C>
where
    P: PrescriptionRepository,
    A: AuditRepository,
    C: Clock,
{
    /// Dispensing closes the prescription for good: `Active` moves to `Expired` and can
    /// never be reopened. Refusals are audited as `DISPENSE_ATTEMPT` failures.
    pub async fn execute(
        &self,
        pharmacist_id: PharmacistId,
        prescription_id: &str,
    ) -> Result<DateTime<Utc>, RecordsServiceError> {
        let detail = self
            .prescriptions
            .find_detail(prescription_id)
            .await?
            .ok_or(RecordsServiceError::PrescriptionNotFound)?;
        let patient_id = detail.prescription.patient_id;
        let actors = AuditActors::pharmacist_on(pharmacist_id, patient_id);

        if detail.prescription.status == PrescriptionStatus::Active {
            let now = self.audit.clock.now();
            let audit = NewAuditEntry::new(AuditAction::Dispensed, true, actors, now)
                .with_detail(prescription_id);
            if self
                .prescriptions
                .dispense(prescription_id, pharmacist_id, now, &audit)
                .await?
            {
                tracing::info!(%pharmacist_id, %prescription_id, "prescription dispensed");
                return Ok(now);
            }
        }

        // Either it was never active or a concurrent dispense won; report what is stored now.
        let status = self
            .prescriptions
            .find_detail(prescription_id)
            .await?
            .map_or(detail.prescription.status, |d| d.prescription.status);
        tracing::warn!(%pharmacist_id, %prescription_id, status = %status, "dispense refused");
        let entry = self
            .audit
            .entry(AuditAction::DispenseAttempt, false, actors)
            .with_detail(format!("Blocked for {prescription_id}; status={status}"));
        self.audit.record(entry).await?;
        Err(RecordsServiceError::PrescriptionNotActive(status.to_string()))
    }
}
