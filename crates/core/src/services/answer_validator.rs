//! Answer validation.
//!
//! A raw submission is checked against the live state of its question,
//! poll and options. Checks run in a fixed order and stop at the first
//! failure, so a rejection always carries exactly one reason.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use pollapi_common::{AppError, AppResult};
use pollapi_db::{
    entities::{poll_option, question, question::QuestionType, user},
    repositories::{PollOptionRepository, PollRepository, QuestionRepository},
};
use regex::Regex;
use serde::Deserialize;

use super::availability::is_active;

// Static pattern, cannot fail to compile
#[allow(clippy::unwrap_used)]
static OPTION_LIST_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[0-9]+(,[0-9]+)*$").unwrap());

/// Raw answer payload as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerSubmission {
    /// Question being answered.
    #[serde(rename = "question")]
    pub question_id: i32,
    /// Comma-separated option ids, optionally wrapped in brackets.
    #[serde(default)]
    pub option: Option<String>,
    /// Free-form text.
    #[serde(default)]
    pub text: Option<String>,
}

/// A submission that passed every check.
#[derive(Debug, Clone)]
pub struct ValidatedAnswer {
    pub question: question::Model,
    pub user: user::Model,
    /// Selected options ordered by number; empty for text questions.
    pub options: Vec<poll_option::Model>,
    /// Answer text; empty for choice questions.
    pub text: String,
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unknown question")]
    UnknownQuestion(i32),

    #[error("poll unavailable")]
    PollUnavailable,

    #[error("empty answer")]
    EmptyAnswer,

    #[error("text required")]
    TextRequired,

    #[error("options required")]
    OptionsRequired,

    #[error("malformed options")]
    MalformedOptions,

    #[error("single option only")]
    SingleOptionOnly,

    #[error("option not owned by question")]
    OptionNotOwned,
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        let message = rejection.to_string();
        match rejection {
            Rejection::UnknownQuestion(_) => Self::NotFound(message),
            Rejection::PollUnavailable => Self::Unavailable(message),
            Rejection::EmptyAnswer => Self::Empty(message),
            Rejection::TextRequired
            | Rejection::OptionsRequired
            | Rejection::MalformedOptions
            | Rejection::SingleOptionOnly => Self::MalformedInput(message),
            Rejection::OptionNotOwned => Self::Ownership(message),
        }
    }
}

/// Strip surrounding whitespace and square brackets from an option field.
#[must_use]
pub fn normalize_option_field(raw: &str) -> &str {
    raw.trim().trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace())
}

/// Check the answer shape against the question type and extract option ids.
///
/// `text` and `options` must already be normalized. Ids too large to be an
/// option id are reported as not owned, since no option can match them.
pub fn check_shape(
    question_type: QuestionType,
    text: &str,
    options: &str,
) -> Result<Vec<i32>, Rejection> {
    if text.is_empty() && options.is_empty() {
        return Err(Rejection::EmptyAnswer);
    }

    match question_type {
        QuestionType::Text => {
            if text.is_empty() {
                return Err(Rejection::TextRequired);
            }
            Ok(vec![])
        }
        QuestionType::OneChoice | QuestionType::MultiChoice => {
            if options.is_empty() {
                return Err(Rejection::OptionsRequired);
            }
            if !OPTION_LIST_RE.is_match(options) {
                return Err(Rejection::MalformedOptions);
            }
            let tokens: Vec<&str> = options.split(',').collect();
            if question_type == QuestionType::OneChoice && tokens.len() != 1 {
                return Err(Rejection::SingleOptionOnly);
            }
            tokens
                .into_iter()
                .map(|token| token.parse::<i32>().map_err(|_| Rejection::OptionNotOwned))
                .collect()
        }
    }
}

/// Validates submissions against stored polls, questions and options.
#[derive(Clone)]
pub struct AnswerValidator {
    question_repo: QuestionRepository,
    poll_repo: PollRepository,
    option_repo: PollOptionRepository,
}

impl AnswerValidator {
    /// Create a new answer validator.
    #[must_use]
    pub const fn new(
        question_repo: QuestionRepository,
        poll_repo: PollRepository,
        option_repo: PollOptionRepository,
    ) -> Self {
        Self {
            question_repo,
            poll_repo,
            option_repo,
        }
    }

    /// Validate a submission by `user` at `now`.
    pub async fn validate(
        &self,
        submission: &AnswerSubmission,
        user: &user::Model,
        now: DateTime<Utc>,
    ) -> AppResult<ValidatedAnswer> {
        let question = self
            .question_repo
            .find_by_id(submission.question_id)
            .await?
            .ok_or(Rejection::UnknownQuestion(submission.question_id))?;

        let poll = self.poll_repo.find_by_id(question.poll_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Question {} references missing poll {}",
                question.id, question.poll_id
            ))
        })?;
        if !is_active(&poll, now) {
            return Err(Rejection::PollUnavailable.into());
        }

        let text = submission.text.as_deref().map_or("", str::trim);
        let options = submission
            .option
            .as_deref()
            .map_or("", normalize_option_field);
        let ids = check_shape(question.question_type, text, options)?;

        let distinct: BTreeSet<i32> = ids.into_iter().collect();
        let distinct: Vec<i32> = distinct.into_iter().collect();
        let owned = self.option_repo.find_owned(question.id, &distinct).await?;
        if owned.len() != distinct.len() {
            tracing::debug!(
                question_id = question.id,
                requested = distinct.len(),
                resolved = owned.len(),
                "Rejected options not owned by question"
            );
            return Err(Rejection::OptionNotOwned.into());
        }

        let text = if question.question_type.is_choice() {
            String::new()
        } else {
            text.to_string()
        };

        Ok(ValidatedAnswer {
            question,
            user: user.clone(),
            options: owned,
            text,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pollapi_db::entities::poll;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn test_user() -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            token: Some("token".to_string()),
            is_admin: false,
            created_at: now().into(),
        }
    }

    fn test_poll(is_ready: bool, end: DateTime<Utc>) -> poll::Model {
        poll::Model {
            id: 1,
            name: "Poll".to_string(),
            start_date: (now() - Duration::days(1)).into(),
            end_date: end.into(),
            description: String::new(),
            is_ready,
        }
    }

    fn test_question(question_type: QuestionType) -> question::Model {
        question::Model {
            id: 10,
            poll_id: 1,
            number: 1,
            question_type,
            text: "Question".to_string(),
        }
    }

    fn test_option(id: i32, number: i32) -> poll_option::Model {
        poll_option::Model {
            id,
            question_id: 10,
            number,
            text: format!("Option {number}"),
        }
    }

    fn submission(option: Option<&str>, text: Option<&str>) -> AnswerSubmission {
        AnswerSubmission {
            question_id: 10,
            option: option.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    fn validator(db: MockDatabase) -> AnswerValidator {
        let db = Arc::new(db.into_connection());
        AnswerValidator::new(
            QuestionRepository::new(db.clone()),
            PollRepository::new(db.clone()),
            PollOptionRepository::new(db),
        )
    }

    #[test]
    fn test_normalize_option_field() {
        assert_eq!(normalize_option_field(" [1,2] "), "1,2");
        assert_eq!(normalize_option_field("[[3]]"), "3");
        assert_eq!(normalize_option_field("[ 4 ]"), "4");
        assert_eq!(normalize_option_field("  "), "");
        assert_eq!(normalize_option_field("1, 2"), "1, 2");
    }

    #[test]
    fn test_check_shape_empty() {
        assert_eq!(
            check_shape(QuestionType::Text, "", ""),
            Err(Rejection::EmptyAnswer)
        );
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", ""),
            Err(Rejection::EmptyAnswer)
        );
    }

    #[test]
    fn test_check_shape_text() {
        assert_eq!(check_shape(QuestionType::Text, "hello", ""), Ok(vec![]));
        assert_eq!(
            check_shape(QuestionType::Text, "", "1"),
            Err(Rejection::TextRequired)
        );
        // Options are ignored for text questions, even when malformed
        assert_eq!(check_shape(QuestionType::Text, "hi", "x,,y"), Ok(vec![]));
    }

    #[test]
    fn test_check_shape_choice() {
        assert_eq!(
            check_shape(QuestionType::OneChoice, "text", ""),
            Err(Rejection::OptionsRequired)
        );
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", "1,,2"),
            Err(Rejection::MalformedOptions)
        );
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", "1, 2"),
            Err(Rejection::MalformedOptions)
        );
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", "-1"),
            Err(Rejection::MalformedOptions)
        );
        assert_eq!(
            check_shape(QuestionType::OneChoice, "", "1,2"),
            Err(Rejection::SingleOptionOnly)
        );
        assert_eq!(check_shape(QuestionType::OneChoice, "", "1"), Ok(vec![1]));
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", "1,3"),
            Ok(vec![1, 3])
        );
    }

    #[test]
    fn test_check_shape_overflow_is_not_owned() {
        assert_eq!(
            check_shape(QuestionType::MultiChoice, "", "1,99999999999"),
            Err(Rejection::OptionNotOwned)
        );
    }

    #[test]
    fn test_rejection_maps_to_taxonomy() {
        assert!(matches!(
            AppError::from(Rejection::UnknownQuestion(1)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(Rejection::PollUnavailable),
            AppError::Unavailable(_)
        ));
        assert!(matches!(
            AppError::from(Rejection::EmptyAnswer),
            AppError::Empty(_)
        ));
        assert!(matches!(
            AppError::from(Rejection::SingleOptionOnly),
            AppError::MalformedInput(_)
        ));
        match AppError::from(Rejection::OptionNotOwned) {
            AppError::Ownership(msg) => assert_eq!(msg, "option not owned by question"),
            other => panic!("Expected Ownership error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_unknown_question() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()]),
        );

        let result = validator
            .validate(&submission(None, Some("hello")), &test_user(), now())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_validate_after_end_date_is_unavailable() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::Text)]])
                .append_query_results([[test_poll(true, now() - Duration::seconds(1))]]),
        );

        let result = validator
            .validate(&submission(None, Some("hello")), &test_user(), now())
            .await;
        match result {
            Err(AppError::Unavailable(msg)) => assert_eq!(msg, "poll unavailable"),
            other => panic!("Expected Unavailable error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_not_ready_is_unavailable() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::Text)]])
                .append_query_results([[test_poll(false, now() + Duration::days(1))]]),
        );

        let result = validator
            .validate(&submission(None, Some("hello")), &test_user(), now())
            .await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_validate_missing_poll_is_internal() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::Text)]])
                .append_query_results([Vec::<poll::Model>::new()]),
        );

        let result = validator
            .validate(&submission(None, Some("hello")), &test_user(), now())
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_validate_text_answer_keeps_text() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::Text)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]]),
        );

        let validated = validator
            .validate(&submission(None, Some("hello")), &test_user(), now())
            .await
            .unwrap();
        assert_eq!(validated.text, "hello");
        assert!(validated.options.is_empty());
        assert_eq!(validated.user.id, "user1");
    }

    #[tokio::test]
    async fn test_validate_text_question_rejects_options_only() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::Text)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]]),
        );

        let result = validator
            .validate(&submission(Some("1"), None), &test_user(), now())
            .await;
        match result {
            Err(AppError::MalformedInput(msg)) => assert_eq!(msg, "text required"),
            other => panic!("Expected MalformedInput error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_whitespace_only_is_empty() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::MultiChoice)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]]),
        );

        let result = validator
            .validate(&submission(Some(" [ ] "), Some("   ")), &test_user(), now())
            .await;
        assert!(matches!(result, Err(AppError::Empty(_))));
    }

    #[tokio::test]
    async fn test_validate_multi_choice_orders_by_number() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::MultiChoice)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]])
                .append_query_results([[test_option(1, 1), test_option(3, 3)]]),
        );

        let validated = validator
            .validate(
                &submission(Some("[3,1]"), Some("ignored")),
                &test_user(),
                now(),
            )
            .await
            .unwrap();
        let ids: Vec<i32> = validated.options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(validated.text, "");
    }

    #[tokio::test]
    async fn test_validate_duplicate_ids_count_once() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::MultiChoice)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]])
                .append_query_results([[test_option(2, 2)]]),
        );

        let validated = validator
            .validate(&submission(Some("2,2"), None), &test_user(), now())
            .await
            .unwrap();
        assert_eq!(validated.options.len(), 1);
    }

    #[tokio::test]
    async fn test_validate_foreign_option_not_owned() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::OneChoice)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]])
                .append_query_results([Vec::<poll_option::Model>::new()]),
        );

        let result = validator
            .validate(&submission(Some("99"), None), &test_user(), now())
            .await;
        assert!(matches!(result, Err(AppError::Ownership(_))));
    }

    #[tokio::test]
    async fn test_validate_one_choice_cardinality() {
        let validator = validator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question(QuestionType::OneChoice)]])
                .append_query_results([[test_poll(true, now() + Duration::days(1))]]),
        );

        let result = validator
            .validate(&submission(Some("1,2"), None), &test_user(), now())
            .await;
        match result {
            Err(AppError::MalformedInput(msg)) => assert_eq!(msg, "single option only"),
            other => panic!("Expected MalformedInput error, got {other:?}"),
        }
    }
}
