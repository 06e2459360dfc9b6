pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_profiles;
mod m20260301_000003_create_sessions;
mod m20260301_000004_create_verification_codes;
mod m20260301_000005_create_access_grants;
mod m20260301_000006_create_audit_entries;
mod m20260301_000007_create_medicines;
mod m20260301_000008_create_prescriptions;
mod m20260301_000009_create_uploads;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_profiles::Migration),
            Box::new(m20260301_000003_create_sessions::Migration),
            Box::new(m20260301_000004_create_verification_codes::Migration),
            Box::new(m20260301_000005_create_access_grants::Migration),
            Box::new(m20260301_000006_create_audit_entries::Migration),
            Box::new(m20260301_000007_create_medicines::Migration),
            Box::new(m20260301_000008_create_prescriptions::Migration),
            Box::new(m20260301_000009_create_uploads::Migration),
        ]
    }
}
