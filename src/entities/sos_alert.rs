use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "sos_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reporter_name: String,
    #[sea_orm(column_type = "Text")]
    pub reporter_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub status: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
