//! Transformer metadata entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transformers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Asset code questions look up (e.g. "T123"); indexed, not unique -
    /// one code can carry several metadata rows over its service life
    #[sea_orm(column_type = "Text")]
    pub code: String,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    /// Feeder circuit the transformer hangs off
    #[sea_orm(column_type = "Text", nullable)]
    pub feeder: Option<String>,

    pub capacity_kva: i32,

    pub commissioned_at: Option<DateTimeWithTimeZone>,

    /// Extensible metadata as JSONB
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
