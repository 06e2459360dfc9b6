use sea_orm::entity::prelude::*;

/// Append-only audit record. Actor columns are plain ids without foreign keys so an entry
/// stays valid whatever happens to the rows it mentions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub doctor_id: Option<Uuid>,
    pub pharmacist_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub action: String,
    pub success: bool,
    pub detail: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
