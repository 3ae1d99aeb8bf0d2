//! Create poll table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poll::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poll::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Poll::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Poll::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Poll::Description).text().not_null())
                    .col(ColumnDef::new(Poll::IsReady).boolean().not_null().default(false))
                    .check(Expr::col(Poll::StartDate).lt(Expr::col(Poll::EndDate)))
                    .to_owned(),
            )
            .await?;

        // Index: (is_ready, start_date, end_date) for the active-poll filter
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_active_window")
                    .table(Poll::Table)
                    .col(Poll::IsReady)
                    .col(Poll::StartDate)
                    .col(Poll::EndDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    Name,
    StartDate,
    EndDate,
    Description,
    IsReady,
}
