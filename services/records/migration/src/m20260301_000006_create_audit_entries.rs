use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign keys on the actor columns: entries outlive whatever they mention.
        manager
            .create_table(
                Table::create()
                    .table(AuditEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditEntries::DoctorId).uuid())
                    .col(ColumnDef::new(AuditEntries::PharmacistId).uuid())
                    .col(ColumnDef::new(AuditEntries::PatientId).uuid())
                    .col(ColumnDef::new(AuditEntries::Action).string_len(32).not_null())
                    .col(ColumnDef::new(AuditEntries::Success).boolean().not_null())
                    .col(ColumnDef::new(AuditEntries::Detail).text())
                    .col(
                        ColumnDef::new(AuditEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditEntries::ExpiresAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AuditEntries::Table)
                    .col(AuditEntries::PatientId)
                    .col(AuditEntries::CreatedAt)
                    .name("idx_audit_entries_patient_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditEntries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditEntries {
    Table,
    Id,
    DoctorId,
    PharmacistId,
    PatientId,
    Action,
    Success,
    Detail,
    CreatedAt,
    ExpiresAt,
}
