//! Create answer and answer option tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Answer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Answer::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Answer::UserId).string_len(32))
                    .col(ColumnDef::new(Answer::QuestionId).integer().not_null())
                    .col(ColumnDef::new(Answer::Text).text().not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_user")
                            .from(Answer::Table, Answer::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_question")
                            .from(Answer::Table, Answer::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, question_id, md5(text)) backs the writer's
        // find-or-create key; hashing keeps long text answers indexable
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_answer_user_question_text
                ON answer (user_id, question_id, md5(text));
                ",
            )
            .await?;

        // Index: question_id (for the completion aggregate)
        manager
            .create_index(
                Index::create()
                    .name("idx_answer_question_id")
                    .table(Answer::Table)
                    .col(Answer::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AnswerOption::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AnswerOption::AnswerId).integer().not_null())
                    .col(ColumnDef::new(AnswerOption::OptionId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(AnswerOption::AnswerId)
                            .col(AnswerOption::OptionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_option_answer")
                            .from(AnswerOption::Table, AnswerOption::AnswerId)
                            .to(Answer::Table, Answer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_option_option")
                            .from(AnswerOption::Table, AnswerOption::OptionId)
                            .to(PollOption::Table, PollOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: option_id (cascade deletes from poll_option)
        manager
            .create_index(
                Index::create()
                    .name("idx_answer_option_option_id")
                    .table(AnswerOption::Table)
                    .col(AnswerOption::OptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnswerOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Answer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Answer {
    Table,
    Id,
    UserId,
    QuestionId,
    Text,
}

#[derive(Iden)]
enum AnswerOption {
    Table,
    AnswerId,
    OptionId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}

#[derive(Iden)]
enum PollOption {
    Table,
    Id,
}
