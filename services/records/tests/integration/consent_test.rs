use chrono::Duration;

use medgate_core::clock::Clock;
use medgate_domain::audit::AuditAction;
use medgate_domain::id::PatientId;
use medgate_records::domain::repository::ConsentRepository;
use medgate_records::error::RecordsServiceError;

use crate::helpers::Fixture;

/// Issue a code for the fixture pair and pin its value to `value`.
async fn issue_known_code(fx: &Fixture, value: &str) -> i64 {
    fx.ledger()
        .issue_code(fx.doctor.id, fx.patient.id)
        .await
        .unwrap();
    let id = fx.store.codes().last().unwrap().id;
    fx.store.set_code(id, value);
    id
}

#[tokio::test]
async fn should_issue_six_digit_code_valid_for_thirty_minutes() {
    let fx = Fixture::new();
    let t0 = fx.clock.now();

    let issued = fx
        .ledger()
        .issue_code(fx.doctor.id, fx.patient.id)
        .await
        .unwrap();

    assert_eq!(issued.code.len(), 6);
    assert!(issued.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(issued.expires_at, t0 + Duration::minutes(30));

    let sent = fx.entries_for(AuditAction::OtpSent);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].success);
    assert_eq!(sent[0].expires_at, Some(issued.expires_at));
    assert!(
        !sent[0].detail.as_deref().unwrap_or_default().contains(&issued.code),
        "the code itself must not be written to the audit trail"
    );
}

#[tokio::test]
async fn should_refuse_code_for_unknown_patient() {
    let fx = Fixture::new();

    let result = fx
        .ledger()
        .issue_code(fx.doctor.id, PatientId::generate())
        .await;

    assert!(
        matches!(result, Err(RecordsServiceError::PatientNotFound)),
        "expected PatientNotFound, got {result:?}"
    );
    assert!(fx.store.codes().is_empty());
    assert!(fx.store.audit_entries().is_empty());
}

#[tokio::test]
async fn should_verify_once_after_a_mismatch() {
    let fx = Fixture::new();
    let t0 = fx.clock.now();
    let ledger = fx.ledger();
    issue_known_code(&fx, "123456").await;

    // T0+1m: wrong code.
    fx.clock.advance_minutes(1);
    let mismatch = ledger.verify_code(fx.doctor.id, fx.patient.id, "654321").await;
    assert!(
        matches!(mismatch, Err(RecordsServiceError::CodeMismatch)),
        "expected CodeMismatch, got {mismatch:?}"
    );
    assert_eq!(fx.failures_for(AuditAction::OtpVerify), 1);
    assert!(!fx.store.codes()[0].is_verified());

    // T0+2m: right code.
    fx.clock.advance_minutes(1);
    let grant = ledger
        .verify_code(fx.doctor.id, fx.patient.id, "123456")
        .await
        .unwrap();
    assert_eq!(grant.expires_at, t0 + Duration::minutes(32));
    assert_eq!(fx.store.codes()[0].verified_at, Some(t0 + Duration::minutes(2)));

    // T0+3m: the same code again.
    fx.clock.advance_minutes(1);
    let again = ledger.verify_code(fx.doctor.id, fx.patient.id, "123456").await;
    assert!(
        matches!(again, Err(RecordsServiceError::CodeAlreadyUsed)),
        "expected CodeAlreadyUsed, got {again:?}"
    );

    assert_eq!(fx.store.grants().len(), 1);
    let verify_entries = fx.entries_for(AuditAction::OtpVerify);
    assert_eq!(verify_entries.len(), 2, "one mismatch and one success");
    assert!(verify_entries[1].success);
    assert_eq!(verify_entries[1].expires_at, Some(grant.expires_at));
}

#[tokio::test]
async fn should_report_expired_code_without_granting() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;

    fx.clock.advance_minutes(31);
    let result = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "123456")
        .await;

    assert!(
        matches!(result, Err(RecordsServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
    let failures = fx.entries_for(AuditAction::OtpVerify);
    assert_eq!(failures.len(), 1);
    assert!(!failures[0].success);
    assert_eq!(
        failures[0].expires_at,
        Some(fx.store.codes()[0].expires_at),
        "the failure names the window that lapsed"
    );
    assert!(fx.store.grants().is_empty());
    assert!(!fx.store.codes()[0].is_verified());
}

#[tokio::test]
async fn should_accept_code_at_its_exact_expiry() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;

    fx.clock.advance_minutes(30);
    let result = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "123456")
        .await;

    assert!(result.is_ok(), "expected grant, got {result:?}");
}

#[tokio::test]
async fn should_make_first_code_unverifiable_once_a_second_is_issued() {
    let fx = Fixture::new();
    let ledger = fx.ledger();
    issue_known_code(&fx, "111111").await;
    fx.clock.advance_minutes(1);
    issue_known_code(&fx, "222222").await;

    let stale = ledger.verify_code(fx.doctor.id, fx.patient.id, "111111").await;
    assert!(
        matches!(stale, Err(RecordsServiceError::CodeMismatch)),
        "expected CodeMismatch for superseded code, got {stale:?}"
    );

    ledger
        .verify_code(fx.doctor.id, fx.patient.id, "222222")
        .await
        .unwrap();
    let stale_again = ledger.verify_code(fx.doctor.id, fx.patient.id, "111111").await;
    assert!(
        matches!(stale_again, Err(RecordsServiceError::CodeAlreadyUsed)),
        "expected CodeAlreadyUsed, got {stale_again:?}"
    );
    assert!(!fx.store.codes()[0].is_verified());
}

#[tokio::test]
async fn should_prefer_higher_id_when_codes_share_a_timestamp() {
    let fx = Fixture::new();
    issue_known_code(&fx, "111111").await;
    issue_known_code(&fx, "222222").await;

    let grant = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "222222")
        .await
        .unwrap();

    assert_eq!(grant.code_id, fx.store.codes()[1].id);
}

#[tokio::test]
async fn should_return_not_found_without_any_code() {
    let fx = Fixture::new();

    let result = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "123456")
        .await;

    assert!(matches!(result, Err(RecordsServiceError::CodeNotFound)));
    assert!(fx.store.audit_entries().is_empty());
}

#[tokio::test]
async fn should_tolerate_surrounding_whitespace_in_submitted_code() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;

    let result = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, " 123456 ")
        .await;

    assert!(result.is_ok(), "expected grant, got {result:?}");
}

#[tokio::test]
async fn should_never_log_submitted_value() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;

    let _ = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "987654")
        .await;

    for entry in fx.store.audit_entries() {
        let detail = entry.detail.unwrap_or_default();
        assert!(!detail.contains("987654"));
        assert!(!detail.contains("123456"));
    }
}

#[tokio::test]
async fn should_reject_blank_code_without_auditing() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;
    let before = fx.store.audit_entries().len();

    for blank in ["", "   "] {
        let result = fx
            .ledger()
            .verify_code(fx.doctor.id, fx.patient.id, blank)
            .await;
        assert!(
            matches!(result, Err(RecordsServiceError::MissingData("code"))),
            "{blank:?}: got {result:?}"
        );
    }

    assert_eq!(fx.store.audit_entries().len(), before);
    assert!(!fx.store.codes()[0].is_verified());
}

#[tokio::test]
async fn should_grant_only_one_of_two_concurrent_verifications() {
    let fx = Fixture::new();
    issue_known_code(&fx, "123456").await;
    let first = fx.ledger();
    let second = fx.ledger();

    let (a, b) = tokio::join!(
        first.verify_code(fx.doctor.id, fx.patient.id, "123456"),
        second.verify_code(fx.doctor.id, fx.patient.id, "123456"),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "{results:?}");
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(RecordsServiceError::CodeAlreadyUsed)))
            .count(),
        1,
        "{results:?}"
    );
    assert_eq!(fx.store.grants().len(), 1);
    let verified = fx.entries_for(AuditAction::OtpVerify);
    assert_eq!(verified.len(), 1);
    assert!(verified[0].success);
}

#[tokio::test]
async fn should_resolve_concurrently_issued_codes_to_the_highest_id() {
    let fx = Fixture::new();
    let first = fx.ledger();
    let second = fx.ledger();

    let (a, b) = tokio::join!(
        first.issue_code(fx.doctor.id, fx.patient.id),
        second.issue_code(fx.doctor.id, fx.patient.id),
    );
    a.unwrap();
    b.unwrap();

    let codes = fx.store.codes();
    assert_eq!(codes.len(), 2);
    let newest = codes.iter().map(|c| c.id).max().unwrap();
    let latest = fx
        .store
        .latest_code(fx.doctor.id, fx.patient.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, newest);

    // Pin distinct values so the older one cannot collide with the newer.
    let older = codes.iter().find(|c| c.id != newest).unwrap().id;
    fx.store.set_code(older, "111111");
    fx.store.set_code(newest, "222222");
    let stale = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "111111")
        .await;
    assert!(matches!(stale, Err(RecordsServiceError::CodeMismatch)), "got {stale:?}");
    let grant = fx
        .ledger()
        .verify_code(fx.doctor.id, fx.patient.id, "222222")
        .await
        .unwrap();
    assert_eq!(grant.code_id, newest);
}
