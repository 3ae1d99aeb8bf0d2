//! Create question table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Question::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Question::PollId).integer().not_null())
                    .col(ColumnDef::new(Question::Number).integer().not_null())
                    .col(ColumnDef::new(Question::QuestionType).string_len(2).not_null())
                    .col(ColumnDef::new(Question::Text).text().not_null())
                    .check(Expr::col(Question::Number).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_poll")
                            .from(Question::Table, Question::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (poll_id, number) - numbers never collide within a poll
        manager
            .create_index(
                Index::create()
                    .name("idx_question_poll_number")
                    .table(Question::Table)
                    .col(Question::PollId)
                    .col(Question::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    PollId,
    Number,
    QuestionType,
    Text,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
