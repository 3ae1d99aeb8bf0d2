//! Question entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of answer a question accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum QuestionType {
    /// Free-form text answer.
    #[sea_orm(string_value = "T")]
    #[serde(rename = "T", alias = "Text")]
    Text,
    /// Exactly one option.
    #[sea_orm(string_value = "OC")]
    #[serde(rename = "OC", alias = "One choice")]
    OneChoice,
    /// One or more options.
    #[sea_orm(string_value = "MC")]
    #[serde(rename = "MC", alias = "Multiple choices")]
    MultiChoice,
}

impl QuestionType {
    /// Human-readable label used in API payloads.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::OneChoice => "One choice",
            Self::MultiChoice => "Multiple choices",
        }
    }

    /// Whether answers select options rather than carry text.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        match self {
            Self::Text => false,
            Self::OneChoice | Self::MultiChoice => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub poll_id: i32,

    /// Position within the poll, unique per poll (gaps allowed)
    pub number: i32,

    pub question_type: QuestionType,

    #[sea_orm(column_type = "Text")]
    pub text: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(has_many = "super::poll_option::Entity")]
    Options,

    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::poll_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(QuestionType::Text.label(), "Text");
        assert_eq!(QuestionType::OneChoice.label(), "One choice");
        assert_eq!(QuestionType::MultiChoice.label(), "Multiple choices");
    }

    #[test]
    fn test_storage_codes() {
        assert_eq!(QuestionType::Text.to_value(), "T");
        assert_eq!(QuestionType::OneChoice.to_value(), "OC");
        assert_eq!(QuestionType::MultiChoice.to_value(), "MC");
    }

    #[test]
    fn test_is_choice() {
        assert!(!QuestionType::Text.is_choice());
        assert!(QuestionType::OneChoice.is_choice());
        assert!(QuestionType::MultiChoice.is_choice());
    }
}
