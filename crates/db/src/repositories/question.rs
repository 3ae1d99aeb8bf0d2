//! Question repository.

use std::sync::Arc;

use crate::entities::{Question, question};
use pollapi_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use super::map_insert_err;

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Questions of several polls, ordered by poll then number.
    pub async fn find_by_polls<C: ConnectionTrait>(
        &self,
        conn: &C,
        poll_ids: &[i32],
    ) -> AppResult<Vec<question::Model>> {
        if poll_ids.is_empty() {
            return Ok(vec![]);
        }
        Question::find()
            .filter(question::Column::PollId.is_in(poll_ids.iter().copied()))
            .order_by_asc(question::Column::PollId)
            .order_by_asc(question::Column::Number)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question; a colliding number is a conflict.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "Question number"))
    }

    /// Save changes to a question; a colliding number is a conflict.
    pub async fn update(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "Question number"))
    }

    /// Delete a question; its options and answers go with it.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        Question::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
