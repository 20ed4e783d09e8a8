use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Community hotline directory entry (barangay office, fire department,
/// CDRRMO and so on), shown on the Emergency screen. Lower priority sorts
/// first.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "emergency_contacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub priority: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
