//! Repositories wrapping sea-orm queries for each aggregate.

mod answer;
mod poll;
mod poll_option;
mod question;
mod user;

pub use answer::AnswerRepository;
pub use poll::PollRepository;
pub use poll_option::PollOptionRepository;
pub use question::QuestionRepository;
pub use user::UserRepository;

use pollapi_common::{AppError, AppResult};
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, SqlErr,
    TransactionTrait,
};

/// Start a read-only transaction that sees one snapshot for all its reads.
pub(crate) async fn begin_snapshot(db: &DatabaseConnection) -> AppResult<DatabaseTransaction> {
    db.begin_with_config(
        Some(IsolationLevel::RepeatableRead),
        Some(AccessMode::ReadOnly),
    )
    .await
    .map_err(|e| AppError::Database(e.to_string()))
}

/// Map an insert failure, surfacing unique-key collisions as conflicts.
pub(crate) fn map_insert_err(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::Conflict(format!("{what} already exists: {detail}"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
