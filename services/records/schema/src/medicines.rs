use sea_orm::entity::prelude::*;

/// Static medicine catalog, seeded by migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "medicines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand_name: String,
    pub generic_name: String,
    pub indications: Option<String>,
    pub standard_dosage: Option<String>,
    pub precautions: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
