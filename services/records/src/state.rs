use sea_orm::DatabaseConnection;

use medgate_core::clock::SystemClock;

use crate::infra::db::{
    DbAuditRepository, DbConsentRepository, DbMedicineRepository, DbPrescriptionRepository,
    DbSessionRepository, DbUploadRepository, DbUserRepository,
};
use crate::infra::storage::LocalStorage;
use crate::usecase::access::AccessGate;
use crate::usecase::audit::AuditLog;
use crate::usecase::consent::ConsentLedger;
use crate::usecase::session::SessionStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: LocalStorage,
    pub clock: SystemClock,
    /// Body limit applied to multipart upload routes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn consent_repo(&self) -> DbConsentRepository {
        DbConsentRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit_repo(&self) -> DbAuditRepository {
        DbAuditRepository {
            db: self.db.clone(),
        }
    }

    pub fn medicine_repo(&self) -> DbMedicineRepository {
        DbMedicineRepository {
            db: self.db.clone(),
        }
    }

    pub fn prescription_repo(&self) -> DbPrescriptionRepository {
        DbPrescriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn upload_repo(&self) -> DbUploadRepository {
        DbUploadRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_store(&self) -> SessionStore<DbSessionRepository, SystemClock> {
        SessionStore {
            sessions: self.session_repo(),
            clock: self.clock,
        }
    }

    pub fn audit_log(&self) -> AuditLog<DbAuditRepository, SystemClock> {
        AuditLog {
            entries: self.audit_repo(),
            clock: self.clock,
        }
    }

    pub fn access_gate(&self) -> AccessGate<DbConsentRepository, SystemClock> {
        AccessGate {
            grants: self.consent_repo(),
            clock: self.clock,
        }
    }

    pub fn consent_ledger(
        &self,
    ) -> ConsentLedger<DbConsentRepository, DbUserRepository, DbAuditRepository, SystemClock> {
        ConsentLedger {
            codes: self.consent_repo(),
            users: self.user_repo(),
            audit: self.audit_log(),
            clock: self.clock,
        }
    }
}
