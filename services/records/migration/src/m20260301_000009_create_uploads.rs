use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Reports::UploaderUserId).uuid().not_null())
                    .col(ColumnDef::new(Reports::FileName).string().not_null())
                    .col(ColumnDef::new(Reports::StorageKey).string().not_null())
                    .col(
                        ColumnDef::new(Reports::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reports::Table, Reports::PatientId)
                            .to(Patients::Table, Patients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reports::Table, Reports::UploaderUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExternalPrescriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalPrescriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExternalPrescriptions::PatientId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalPrescriptions::FileName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalPrescriptions::StorageKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalPrescriptions::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExternalPrescriptions::Table, ExternalPrescriptions::PatientId)
                            .to(Patients::Table, Patients::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExternalPrescriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
    PatientId,
    UploaderUserId,
    FileName,
    StorageKey,
    UploadedAt,
}

#[derive(Iden)]
enum ExternalPrescriptions {
    Table,
    Id,
    PatientId,
    FileName,
    StorageKey,
    UploadedAt,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
