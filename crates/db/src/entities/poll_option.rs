//! Option entity - one selectable choice of a question.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_option")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub question_id: i32,

    /// Display position within the question, unique per question
    pub number: i32,

    #[sea_orm(column_type = "Text")]
    pub text: String,
}

impl Model {
    /// Render as shown in answer reports, e.g. `(2) Blue`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("({}) {}", self.number, self.text)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,

    #[sea_orm(has_many = "super::answer_option::Entity")]
    AnswerOptions,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::answer_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerOptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
