//! Create poll option table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollOption::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollOption::QuestionId).integer().not_null())
                    .col(ColumnDef::new(PollOption::Number).integer().not_null())
                    .col(ColumnDef::new(PollOption::Text).text().not_null())
                    .check(Expr::col(PollOption::Number).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_option_question")
                            .from(PollOption::Table, PollOption::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (question_id, number)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_option_question_number")
                    .table(PollOption::Table)
                    .col(PollOption::QuestionId)
                    .col(PollOption::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollOption::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollOption {
    Table,
    Id,
    QuestionId,
    Number,
    Text,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}
