//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Answering opens strictly after this instant
    pub start_date: DateTimeWithTimeZone,

    /// Answering closes at this instant
    pub end_date: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Set by an administrator once the poll is fully assembled
    #[sea_orm(default_value = false)]
    pub is_ready: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Questions,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
