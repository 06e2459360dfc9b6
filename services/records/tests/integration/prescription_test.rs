use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::PharmacistId;
use medgate_domain::prescription::PrescriptionStatus;
use medgate_records::domain::types::Prescription;
use medgate_records::error::RecordsServiceError;
use medgate_records::usecase::prescription::{
    CreatePrescriptionInput, CreatePrescriptionUseCase, DispensePrescriptionUseCase,
    ListMedicinesUseCase, LookupPrescriptionUseCase, MedicineLine,
};
use medgate_testing::clock::ManualClock;

use crate::helpers::{Fixture, MemoryStore};

type Create =
    CreatePrescriptionUseCase<MemoryStore, MemoryStore, MemoryStore, MemoryStore, MemoryStore, ManualClock>;

fn create_uc(fx: &Fixture) -> Create {
    CreatePrescriptionUseCase {
        users: fx.store.clone(),
        medicines: fx.store.clone(),
        prescriptions: fx.store.clone(),
        gate: fx.gate(),
        audit: fx.audit_log(),
    }
}

fn dispense_uc(fx: &Fixture) -> DispensePrescriptionUseCase<MemoryStore, MemoryStore, ManualClock> {
    DispensePrescriptionUseCase {
        prescriptions: fx.store.clone(),
        audit: fx.audit_log(),
    }
}

fn one_line(fx: &Fixture, dosage: Option<&str>) -> CreatePrescriptionInput {
    CreatePrescriptionInput {
        patient_id: fx.patient.id,
        medicines: vec![MedicineLine {
            medicine_id: 1,
            dosage: dosage.map(str::to_owned),
        }],
        doctor_notes: Some("Rest and fluids".to_owned()),
        digital_signature: Some("Dr. Asha Rao".to_owned()),
    }
}

async fn prescribe(fx: &Fixture) -> Prescription {
    fx.grant_access().await;
    create_uc(fx)
        .execute(fx.doctor.id, one_line(fx, None))
        .await
        .unwrap()
}

#[tokio::test]
async fn should_list_catalog_by_brand_name() {
    let fx = Fixture::new();

    let medicines = ListMedicinesUseCase {
        medicines: fx.store.clone(),
    }
    .execute()
    .await
    .unwrap();

    let brands: Vec<&str> = medicines.iter().map(|m| m.brand_name.as_str()).collect();
    assert_eq!(brands, vec!["Augmentin 625", "Dolo 650"]);
}

#[tokio::test]
async fn should_create_active_prescription_with_qr_payload() {
    let fx = Fixture::new();
    let prescription = prescribe(&fx).await;

    assert!(prescription.id.starts_with("RX-20260301"), "got {}", prescription.id);
    assert_eq!(prescription.qr_payload, format!("MEDGATE:{}", prescription.id));
    assert_eq!(prescription.status, PrescriptionStatus::Active);
    assert_eq!(prescription.medicines.len(), 1);
    assert_eq!(
        prescription.medicines[0].dosage.as_deref(),
        Some("1 tablet every 6 hours"),
        "blank dosage falls back to the standard dosage"
    );

    let created = fx.entries_for(AuditAction::PrescriptionCreate);
    assert_eq!(created.len(), 1);
    assert!(created[0].success);
    assert_eq!(created[0].detail.as_deref(), Some(prescription.id.as_str()));
    assert!(fx.store.prescription(&prescription.id).is_some());
}

#[tokio::test]
async fn should_keep_explicit_dosage() {
    let fx = Fixture::new();
    fx.grant_access().await;

    let prescription = create_uc(&fx)
        .execute(fx.doctor.id, one_line(&fx, Some("2 tablets at night")))
        .await
        .unwrap();

    assert_eq!(prescription.medicines[0].dosage.as_deref(), Some("2 tablets at night"));
}

#[tokio::test]
async fn should_deny_prescription_without_grant() {
    let fx = Fixture::new();

    let result = create_uc(&fx).execute(fx.doctor.id, one_line(&fx, None)).await;

    assert!(
        matches!(result, Err(RecordsServiceError::AccessDenied)),
        "expected AccessDenied, got {result:?}"
    );
    assert_eq!(fx.failures_for(AuditAction::PrescriptionCreate), 1);
    assert!(fx.store.tables.lock().unwrap().prescriptions.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_medicine() {
    let fx = Fixture::new();
    fx.grant_access().await;
    let mut input = one_line(&fx, None);
    input.medicines.push(MedicineLine {
        medicine_id: 999,
        dosage: None,
    });

    let result = create_uc(&fx).execute(fx.doctor.id, input).await;

    assert!(
        matches!(result, Err(RecordsServiceError::InvalidMedicine(999))),
        "expected InvalidMedicine(999), got {result:?}"
    );
    assert!(fx.entries_for(AuditAction::PrescriptionCreate).is_empty());
}

#[tokio::test]
async fn should_require_at_least_one_medicine() {
    let fx = Fixture::new();
    let mut input = one_line(&fx, None);
    input.medicines.clear();

    let result = create_uc(&fx).execute(fx.doctor.id, input).await;

    assert!(matches!(result, Err(RecordsServiceError::MissingData("medicines"))));
}

#[tokio::test]
async fn should_look_up_by_id_or_qr_payload() {
    let fx = Fixture::new();
    let prescription = prescribe(&fx).await;
    let lookup = LookupPrescriptionUseCase {
        prescriptions: fx.store.clone(),
    };

    let by_id = lookup.execute(&prescription.id).await.unwrap();
    let by_qr = lookup.execute(&prescription.qr_payload).await.unwrap();

    assert_eq!(by_id.prescription.id, prescription.id);
    assert_eq!(by_qr.prescription.id, prescription.id);
    assert_eq!(by_qr.doctor_name, "Dr. Asha Rao");
    assert_eq!(by_qr.patient_mobile, "9000000001");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_prescription() {
    let fx = Fixture::new();
    let lookup = LookupPrescriptionUseCase {
        prescriptions: fx.store.clone(),
    };

    let result = lookup.execute("MEDGATE:RX-00000000000000-FFFF").await;

    assert!(matches!(result, Err(RecordsServiceError::PrescriptionNotFound)));
}

#[tokio::test]
async fn should_dispense_active_prescription_once() {
    let fx = Fixture::new();
    let prescription = prescribe(&fx).await;
    fx.clock.advance_minutes(45);

    let dispensed_at = dispense_uc(&fx)
        .execute(fx.pharmacist.id, &prescription.id)
        .await
        .unwrap();

    assert_eq!(dispensed_at, fx.clock.now());
    let stored = fx.store.prescription(&prescription.id).unwrap();
    assert_eq!(stored.status, PrescriptionStatus::Expired);
    assert_eq!(stored.dispensed_at, Some(dispensed_at));
    assert_eq!(stored.pharmacist_id, Some(fx.pharmacist.id));

    let done = fx.entries_for(AuditAction::Dispensed);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].actors.pharmacist_id, Some(fx.pharmacist.id));
    assert_eq!(done[0].actors.patient_id, Some(fx.patient.id));
}

#[tokio::test]
async fn should_refuse_second_dispense_and_audit_attempt() {
    let fx = Fixture::new();
    let prescription = prescribe(&fx).await;
    let uc = dispense_uc(&fx);
    uc.execute(fx.pharmacist.id, &prescription.id).await.unwrap();

    let again = uc.execute(PharmacistId::generate(), &prescription.id).await;

    match again {
        Err(RecordsServiceError::PrescriptionNotActive(status)) => assert_eq!(status, "Expired"),
        other => panic!("expected PrescriptionNotActive, got {other:?}"),
    }
    let attempts = fx.entries_for(AuditAction::DispenseAttempt);
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].success);
    assert_eq!(
        attempts[0].detail.as_deref(),
        Some(format!("Blocked for {}; status=Expired", prescription.id).as_str())
    );
    assert_eq!(
        fx.store.prescription(&prescription.id).unwrap().pharmacist_id,
        Some(fx.pharmacist.id),
        "the first dispense is never overwritten"
    );
}

#[tokio::test]
async fn should_return_not_found_when_dispensing_unknown_prescription() {
    let fx = Fixture::new();

    let result = dispense_uc(&fx).execute(fx.pharmacist.id, "RX-missing").await;

    assert!(matches!(result, Err(RecordsServiceError::PrescriptionNotFound)));
    assert!(fx.store.audit_entries().is_empty());
}
