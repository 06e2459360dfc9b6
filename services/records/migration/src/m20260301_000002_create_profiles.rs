use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Doctors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Doctors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Doctors::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Doctors::FullName).string().not_null())
                    .col(
                        ColumnDef::new(Doctors::RegistrationNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Doctors::Specialization).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Doctors::Table, Doctors::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pharmacists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pharmacists::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Pharmacists::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Pharmacists::FullName).string().not_null())
                    .col(ColumnDef::new(Pharmacists::PharmacyName).string())
                    .col(
                        ColumnDef::new(Pharmacists::LicenseNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pharmacists::Table, Pharmacists::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Patients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Patients::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Patients::FullName).string().not_null())
                    .col(ColumnDef::new(Patients::Mobile).string().not_null().unique_key())
                    .col(ColumnDef::new(Patients::Dob).string())
                    .col(ColumnDef::new(Patients::Gender).string())
                    .col(
                        ColumnDef::new(Patients::Allergies)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Patients::ChronicConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Patients::Table, Patients::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pharmacists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Doctors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Doctors {
    Table,
    Id,
    UserId,
    FullName,
    RegistrationNumber,
    Specialization,
}

#[derive(Iden)]
enum Pharmacists {
    Table,
    Id,
    UserId,
    FullName,
    PharmacyName,
    LicenseNumber,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
    UserId,
    FullName,
    Mobile,
    Dob,
    Gender,
    Allergies,
    ChronicConditions,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
