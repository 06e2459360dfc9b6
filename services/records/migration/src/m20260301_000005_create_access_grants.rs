use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessGrants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessGrants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessGrants::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(AccessGrants::PatientId).uuid().not_null())
                    .col(ColumnDef::new(AccessGrants::CodeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(AccessGrants::GrantedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessGrants::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AccessGrants::Table, AccessGrants::CodeId)
                            .to(VerificationCodes::Table, VerificationCodes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One grant per code: a code verifies at most once.
        manager
            .create_index(
                Index::create()
                    .table(AccessGrants::Table)
                    .col(AccessGrants::CodeId)
                    .unique()
                    .name("uq_access_grants_code_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AccessGrants::Table)
                    .col(AccessGrants::DoctorId)
                    .col(AccessGrants::PatientId)
                    .col(AccessGrants::GrantedAt)
                    .col(AccessGrants::Id)
                    .name("idx_access_grants_pair_latest")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessGrants::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AccessGrants {
    Table,
    Id,
    DoctorId,
    PatientId,
    CodeId,
    GrantedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum VerificationCodes {
    Table,
    Id,
}
