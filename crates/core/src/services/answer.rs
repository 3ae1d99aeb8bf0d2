//! Answer service.

use std::collections::HashMap;

use chrono::Utc;
use pollapi_common::{AppError, AppResult};
use pollapi_db::{
    entities::{answer, user},
    repositories::AnswerRepository,
};

use super::answer_validator::{AnswerSubmission, AnswerValidator};
use super::answer_writer::{AnswerWriter, WrittenAnswer};

/// An answer with its selected options rendered for display.
#[derive(Debug, Clone)]
pub struct AnswerListItem {
    pub answer: answer::Model,
    /// Option display strings ordered by number, joined by ` | `.
    pub options: String,
}

/// Answer service for submission and administrative listing.
#[derive(Clone)]
pub struct AnswerService {
    validator: AnswerValidator,
    writer: AnswerWriter,
    answer_repo: AnswerRepository,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(
        validator: AnswerValidator,
        writer: AnswerWriter,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            validator,
            writer,
            answer_repo,
        }
    }

    /// Validate and persist a submission on behalf of `user`.
    pub async fn submit(
        &self,
        user: &user::Model,
        submission: &AnswerSubmission,
    ) -> AppResult<WrittenAnswer> {
        let validated = self.validator.validate(submission, user, Utc::now()).await?;
        self.writer.write(&validated).await
    }

    /// List answers newest first, optionally restricted to one user.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<AnswerListItem>> {
        let txn = self.answer_repo.begin_snapshot().await?;
        let answers = self
            .answer_repo
            .find_all(&txn, user_id, limit, offset)
            .await?;
        let ids: Vec<i32> = answers.iter().map(|a| a.id).collect();
        let selected = self.answer_repo.find_selected_options(&txn, &ids).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut by_answer: HashMap<i32, Vec<_>> = HashMap::new();
        for (answer_id, option) in selected {
            by_answer.entry(answer_id).or_default().push(option);
        }

        Ok(answers
            .into_iter()
            .map(|answer| {
                let mut options = by_answer.remove(&answer.id).unwrap_or_default();
                options.sort_by_key(|o| (o.number, o.id));
                let options = options
                    .iter()
                    .map(|o| o.display())
                    .collect::<Vec<_>>()
                    .join(" | ");
                AnswerListItem { answer, options }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pollapi_db::{
        entities::poll_option,
        repositories::{PollOptionRepository, PollRepository, QuestionRepository},
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> AnswerService {
        let db = Arc::new(db);
        let answer_repo = AnswerRepository::new(db.clone());
        AnswerService::new(
            AnswerValidator::new(
                QuestionRepository::new(db.clone()),
                PollRepository::new(db.clone()),
                PollOptionRepository::new(db),
            ),
            AnswerWriter::new(answer_repo.clone()),
            answer_repo,
        )
    }

    fn selected_row(
        answer_id: i32,
        option: &poll_option::Model,
    ) -> BTreeMap<&'static str, Value> {
        // Columns of `find_also_related`: A_ prefix for the link, B_ for the option
        BTreeMap::from([
            ("A_answer_id", Value::Int(Some(answer_id))),
            ("A_option_id", Value::Int(Some(option.id))),
            ("B_id", Value::Int(Some(option.id))),
            ("B_question_id", Value::Int(Some(option.question_id))),
            ("B_number", Value::Int(Some(option.number))),
            ("B_text", Value::String(Some(Box::new(option.text.clone())))),
        ])
    }

    #[tokio::test]
    async fn test_list_renders_options_by_number() {
        let answer = answer::Model {
            id: 3,
            user_id: Some("user1".to_string()),
            question_id: 10,
            text: String::new(),
        };
        let blue = poll_option::Model {
            id: 21,
            question_id: 10,
            number: 2,
            text: "Blue".to_string(),
        };
        let red = poll_option::Model {
            id: 20,
            question_id: 10,
            number: 1,
            text: "Red".to_string(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[answer.clone()]])
            .append_query_results([vec![selected_row(3, &blue), selected_row(3, &red)]])
            .into_connection();

        let items = service(db).list(Some("user1"), 10, 0).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].answer, answer);
        assert_eq!(items[0].options, "(1) Red | (2) Blue");
    }

    #[tokio::test]
    async fn test_list_text_answer_has_no_options() {
        let answer = answer::Model {
            id: 4,
            user_id: Some("user1".to_string()),
            question_id: 11,
            text: "hello".to_string(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[answer]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let items = service(db).list(None, 10, 0).await.unwrap();
        assert_eq!(items[0].options, "");
    }
}
