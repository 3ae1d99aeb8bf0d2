//! Poll option repository.

use std::sync::Arc;

use crate::entities::{PollOption, poll_option};
use pollapi_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use super::map_insert_err;

/// Poll option repository for database operations.
#[derive(Clone)]
pub struct PollOptionRepository {
    db: Arc<DatabaseConnection>,
}

impl PollOptionRepository {
    /// Create a new option repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an option by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<poll_option::Model>> {
        PollOption::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of several questions, ordered by number.
    pub async fn find_by_questions<C: ConnectionTrait>(
        &self,
        conn: &C,
        question_ids: &[i32],
    ) -> AppResult<Vec<poll_option::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }
        PollOption::find()
            .filter(poll_option::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(poll_option::Column::Number)
            .order_by_asc(poll_option::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options among `ids` that belong to `question_id`, ordered by number.
    ///
    /// Ids that are unknown or belong to another question are simply absent
    /// from the result; callers compare counts to detect them.
    pub async fn find_owned(
        &self,
        question_id: i32,
        ids: &[i32],
    ) -> AppResult<Vec<poll_option::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        PollOption::find()
            .filter(poll_option::Column::QuestionId.eq(question_id))
            .filter(poll_option::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(poll_option::Column::Number)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new option; a colliding number is a conflict.
    pub async fn create(&self, model: poll_option::ActiveModel) -> AppResult<poll_option::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "Option number"))
    }

    /// Options of one question, ordered by number.
    pub async fn find_by_question(&self, question_id: i32) -> AppResult<Vec<poll_option::Model>> {
        self.find_by_questions(self.db.as_ref(), &[question_id]).await
    }

    /// Save changes to an option; a colliding number is a conflict.
    pub async fn update(&self, model: poll_option::ActiveModel) -> AppResult<poll_option::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "Option number"))
    }

    /// Delete an option.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        PollOption::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_option(id: i32, question_id: i32, number: i32) -> poll_option::Model {
        poll_option::Model {
            id,
            question_id,
            number,
            text: format!("Option {number}"),
        }
    }

    #[tokio::test]
    async fn test_find_owned() {
        let o1 = create_test_option(1, 5, 1);
        let o3 = create_test_option(3, 5, 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[o1, o3]])
                .into_connection(),
        );

        let repo = PollOptionRepository::new(db);
        let options = repo.find_owned(5, &[1, 3]).await.unwrap();
        assert_eq!(options.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_find_owned_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = PollOptionRepository::new(db);
        assert!(repo.find_owned(5, &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(create_test_option(9, 1, 2).display(), "(2) Option 2");
    }
}
