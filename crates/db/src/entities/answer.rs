//! Answer entity - one user's response to one question.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Always set on the authenticated submission path
    #[sea_orm(nullable, indexed)]
    pub user_id: Option<String>,

    #[sea_orm(indexed)]
    pub question_id: i32,

    /// Text answer; empty for choice questions
    #[sea_orm(column_type = "Text", default_value = "")]
    pub text: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

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

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
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

impl Related<super::poll_option::Entity> for Entity {
    fn to() -> RelationDef {
        super::answer_option::Relation::PollOption.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::answer_option::Relation::Answer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
