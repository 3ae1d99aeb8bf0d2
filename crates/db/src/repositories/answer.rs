//! Answer repository.
//!
//! Write-path methods take the connection explicitly so the answer writer
//! can run find-or-create and option merging inside one transaction.

use std::sync::Arc;

use crate::entities::{Answer, AnswerOption, PollOption, answer, answer_option, poll_option};
use pollapi_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::OnConflict,
};

use super::{begin_snapshot, map_insert_err};

/// Answer repository for database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction for a write.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the answer row identified by the writer's key.
    pub async fn find_by_key<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        question_id: i32,
        text: &str,
    ) -> AppResult<Option<answer::Model>> {
        Answer::find()
            .filter(answer::Column::UserId.eq(user_id))
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::Text.eq(text))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an answer row; a racing duplicate surfaces as a conflict.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: answer::ActiveModel,
    ) -> AppResult<answer::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| map_insert_err(e, "Answer"))
    }

    /// IDs of the options already attached to an answer.
    pub async fn find_option_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        answer_id: i32,
    ) -> AppResult<Vec<i32>> {
        let rows = AnswerOption::find()
            .filter(answer_option::Column::AnswerId.eq(answer_id))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.option_id).collect())
    }

    /// Attach options to an answer, skipping pairs that already exist.
    pub async fn attach_options<C: ConnectionTrait>(
        &self,
        conn: &C,
        answer_id: i32,
        option_ids: &[i32],
    ) -> AppResult<u64> {
        if option_ids.is_empty() {
            return Ok(0);
        }
        let rows = option_ids.iter().map(|&option_id| answer_option::ActiveModel {
            answer_id: Set(answer_id),
            option_id: Set(option_id),
        });
        AnswerOption::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    answer_option::Column::AnswerId,
                    answer_option::Column::OptionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Start a read-only snapshot for multi-query reads.
    pub async fn begin_snapshot(&self) -> AppResult<DatabaseTransaction> {
        begin_snapshot(self.db.as_ref()).await
    }

    /// A user's answers to the given questions, oldest first.
    pub async fn find_by_user_and_questions<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        question_ids: &[i32],
    ) -> AppResult<Vec<answer::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }
        Answer::find()
            .filter(answer::Column::UserId.eq(user_id))
            .filter(answer::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(answer::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options selected by each of the given answers, as `(answer_id, option)`.
    pub async fn find_selected_options<C: ConnectionTrait>(
        &self,
        conn: &C,
        answer_ids: &[i32],
    ) -> AppResult<Vec<(i32, poll_option::Model)>> {
        if answer_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = AnswerOption::find()
            .filter(answer_option::Column::AnswerId.is_in(answer_ids.iter().copied()))
            .find_also_related(PollOption)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, option)| option.map(|o| (link.answer_id, o)))
            .collect())
    }

    /// List answers, newest first, optionally for one user.
    pub async fn find_all<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<answer::Model>> {
        let mut query = Answer::find().order_by_desc(answer::Column::Id);
        if let Some(user_id) = user_id {
            query = query.filter(answer::Column::UserId.eq(user_id));
        }
        query
            .limit(limit)
            .offset(offset)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
