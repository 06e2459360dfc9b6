use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prescriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prescriptions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prescriptions::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(Prescriptions::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Prescriptions::Medicines).json_binary().not_null())
                    .col(ColumnDef::new(Prescriptions::DoctorNotes).text())
                    .col(ColumnDef::new(Prescriptions::DigitalSignature).text())
                    .col(
                        ColumnDef::new(Prescriptions::Status)
                            .string_len(16)
                            .not_null()
                            .default("Active"),
                    )
                    .col(
                        ColumnDef::new(Prescriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Prescriptions::DispensedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Prescriptions::PharmacistId).uuid())
                    .col(ColumnDef::new(Prescriptions::QrPayload).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::DoctorId)
                            .to(Doctors::Table, Doctors::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::PatientId)
                            .to(Patients::Table, Patients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Prescriptions::Table, Prescriptions::PharmacistId)
                            .to(Pharmacists::Table, Pharmacists::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Prescriptions::Table)
                    .col(Prescriptions::PatientId)
                    .name("idx_prescriptions_patient_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prescriptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Prescriptions {
    Table,
    Id,
    DoctorId,
    PatientId,
    Medicines,
    DoctorNotes,
    DigitalSignature,
    Status,
    CreatedAt,
    DispensedAt,
    PharmacistId,
    QrPayload,
}

#[derive(Iden)]
enum Doctors {
    Table,
    Id,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Pharmacists {
    Table,
    Id,
}
