use sea_orm::entity::prelude::*;

/// Prescription scan a patient uploaded themselves.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "external_prescriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub patient_id: Uuid,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
