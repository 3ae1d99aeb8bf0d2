//! Poll repository.

use std::sync::Arc;

use crate::entities::{Poll, poll};
use chrono::{DateTime, Utc};
use pollapi_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Statement,
};

use super::begin_snapshot;

/// Polls where every question has an answer row from the given user.
///
/// The inner join on `question` drops polls without questions; counting
/// distinct answered questions tolerates several rows per question.
const COMPLETED_POLLS_SQL: &str = r"
    SELECT p.id AS id
    FROM poll p
    JOIN question q ON q.poll_id = p.id
    LEFT JOIN answer a ON a.question_id = q.id AND a.user_id = $1
    GROUP BY p.id, p.start_date
    HAVING COUNT(DISTINCT q.id) = COUNT(DISTINCT a.question_id)
    ORDER BY p.start_date, p.id
";

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// List all polls ordered by start date.
    pub async fn find_all(&self) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .order_by_asc(poll::Column::StartDate)
            .order_by_asc(poll::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List polls open for answering at `now`, ordered by start date.
    pub async fn find_active(&self, now: DateTime<Utc>) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::IsReady.eq(true))
            .filter(poll::Column::StartDate.lt(now))
            .filter(poll::Column::EndDate.gt(now))
            .order_by_asc(poll::Column::StartDate)
            .order_by_asc(poll::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find one poll if it is open for answering at `now`.
    pub async fn find_active_by_id(
        &self,
        id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .filter(poll::Column::IsReady.eq(true))
            .filter(poll::Column::StartDate.lt(now))
            .filter(poll::Column::EndDate.gt(now))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Start a read-only snapshot for multi-query reads.
    pub async fn begin_snapshot(&self) -> AppResult<DatabaseTransaction> {
        begin_snapshot(self.db.as_ref()).await
    }

    /// Load polls by ID, ordered by start date.
    pub async fn find_by_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[i32],
    ) -> AppResult<Vec<poll::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Poll::find()
            .filter(poll::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(poll::Column::StartDate)
            .order_by_asc(poll::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of the polls the user has fully answered, in one aggregate query.
    pub async fn find_completed_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<Vec<i32>> {
        let rows = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                COMPLETED_POLLS_SQL,
                [user_id.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<i32>("", "id")
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .collect()
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a poll; questions, options and answers go with it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        Poll::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
