//! Poll service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pollapi_common::{
    AppError, AppResult,
    format::{deserialize_date, deserialize_optional_date},
};
use pollapi_db::{
    entities::{poll, poll_option, question, question::QuestionType},
    repositories::{PollOptionRepository, PollRepository, QuestionRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Poll service for reading and administering polls.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    option_repo: PollOptionRepository,
}

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePollInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_date")]
    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_ready: bool,
}

/// Input for updating a poll. The start date cannot change once created.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePollInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<DateTime<Utc>>,

    pub description: Option<String>,

    pub is_ready: Option<bool>,
}

/// Input for adding a question to a poll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionInput {
    #[validate(range(min = 0))]
    pub number: i32,

    #[serde(alias = "type")]
    pub question_type: QuestionType,

    #[validate(length(min = 1))]
    pub text: String,
}

/// Input for editing a question. Moving it to another poll keeps its options.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionInput {
    #[serde(alias = "poll")]
    pub poll_id: Option<i32>,

    #[validate(range(min = 0))]
    pub number: Option<i32>,

    #[serde(alias = "type")]
    pub question_type: Option<QuestionType>,

    #[validate(length(min = 1))]
    pub text: Option<String>,
}

/// Input for adding an option to a choice question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOptionInput {
    #[validate(range(min = 0))]
    pub number: i32,

    #[validate(length(min = 1))]
    pub text: String,
}

/// Input for editing an option.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOptionInput {
    #[validate(range(min = 0))]
    pub number: Option<i32>,

    #[validate(length(min = 1))]
    pub text: Option<String>,
}

/// A question with its options ordered by number.
#[derive(Debug, Clone)]
pub struct QuestionWithOptions {
    pub question: question::Model,
    pub options: Vec<poll_option::Model>,
}

/// A poll with its questions ordered by number.
#[derive(Debug, Clone)]
pub struct PollDetail {
    pub poll: poll::Model,
    pub questions: Vec<QuestionWithOptions>,
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if start < end {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Poll start date must be before its end date".to_string(),
        ))
    }
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        option_repo: PollOptionRepository,
    ) -> Self {
        Self {
            poll_repo,
            question_repo,
            option_repo,
        }
    }

    /// Polls open for answering at `now`, ordered by start date.
    pub async fn list_active(&self, now: DateTime<Utc>) -> AppResult<Vec<poll::Model>> {
        self.poll_repo.find_active(now).await
    }

    /// An active poll with its questions and options.
    ///
    /// Inactive polls are indistinguishable from missing ones.
    pub async fn get_active_detail(&self, id: i32, now: DateTime<Utc>) -> AppResult<PollDetail> {
        let poll = self
            .poll_repo
            .find_active_by_id(id, now)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))?;
        self.load_detail(poll).await
    }

    /// Any poll with its questions and options.
    pub async fn get_detail(&self, id: i32) -> AppResult<PollDetail> {
        let poll = self.poll_repo.get_by_id(id).await?;
        self.load_detail(poll).await
    }

    /// Every poll, ordered by start date.
    pub async fn list_all(&self) -> AppResult<Vec<poll::Model>> {
        self.poll_repo.find_all().await
    }

    async fn load_detail(&self, poll: poll::Model) -> AppResult<PollDetail> {
        let txn = self.poll_repo.begin_snapshot().await?;
        let questions = self.question_repo.find_by_polls(&txn, &[poll.id]).await?;
        let question_ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
        let options = self
            .option_repo
            .find_by_questions(&txn, &question_ids)
            .await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut by_question: HashMap<i32, Vec<poll_option::Model>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        let questions = questions
            .into_iter()
            .map(|question| QuestionWithOptions {
                options: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect();

        Ok(PollDetail { poll, questions })
    }

    /// Create a poll.
    pub async fn create_poll(&self, input: CreatePollInput) -> AppResult<poll::Model> {
        input.validate()?;
        check_window(input.start_date, input.end_date)?;

        let model = poll::ActiveModel {
            name: Set(input.name),
            start_date: Set(input.start_date.into()),
            end_date: Set(input.end_date.into()),
            description: Set(input.description),
            is_ready: Set(input.is_ready),
            ..Default::default()
        };
        let poll = self.poll_repo.create(model).await?;

        tracing::info!(poll_id = poll.id, name = %poll.name, "Created poll");
        Ok(poll)
    }

    /// Update a poll's mutable fields.
    pub async fn update_poll(&self, id: i32, input: UpdatePollInput) -> AppResult<poll::Model> {
        input.validate()?;
        let poll = self.poll_repo.get_by_id(id).await?;

        if let Some(end_date) = input.end_date {
            check_window(poll.start_date.with_timezone(&Utc), end_date)?;
        }

        let mut active: poll::ActiveModel = poll.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date.into());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(is_ready) = input.is_ready {
            active.is_ready = Set(is_ready);
        }

        let poll = self.poll_repo.update(active).await?;
        tracing::info!(poll_id = poll.id, is_ready = poll.is_ready, "Updated poll");
        Ok(poll)
    }

    /// Delete a poll together with its questions, options and answers.
    pub async fn delete_poll(&self, id: i32) -> AppResult<()> {
        self.poll_repo.get_by_id(id).await?;
        self.poll_repo.delete(id).await?;
        tracing::info!(poll_id = id, "Deleted poll");
        Ok(())
    }

    /// Add a question to a poll; numbers are unique within the poll.
    pub async fn add_question(
        &self,
        poll_id: i32,
        input: CreateQuestionInput,
    ) -> AppResult<question::Model> {
        input.validate()?;
        self.poll_repo.get_by_id(poll_id).await?;

        let model = question::ActiveModel {
            poll_id: Set(poll_id),
            number: Set(input.number),
            question_type: Set(input.question_type),
            text: Set(input.text),
            ..Default::default()
        };
        self.question_repo.create(model).await
    }

    /// Edit a question; a number taken in the target poll is a conflict.
    ///
    /// A choice question that still has options cannot become a text one.
    pub async fn update_question(
        &self,
        id: i32,
        input: UpdateQuestionInput,
    ) -> AppResult<question::Model> {
        input.validate()?;
        let question = self.get_question(id).await?;

        if let Some(poll_id) = input.poll_id
            && poll_id != question.poll_id
        {
            self.poll_repo.get_by_id(poll_id).await?;
        }
        if let Some(question_type) = input.question_type
            && !question_type.is_choice()
            && question.question_type.is_choice()
            && !self.option_repo.find_by_question(id).await?.is_empty()
        {
            return Err(AppError::BadRequest(
                "Remove the options before making this a text question".to_string(),
            ));
        }

        let mut active: question::ActiveModel = question.into();
        if let Some(poll_id) = input.poll_id {
            active.poll_id = Set(poll_id);
        }
        if let Some(number) = input.number {
            active.number = Set(number);
        }
        if let Some(question_type) = input.question_type {
            active.question_type = Set(question_type);
        }
        if let Some(text) = input.text {
            active.text = Set(text);
        }

        let question = self.question_repo.update(active).await?;
        tracing::info!(question_id = question.id, poll_id = question.poll_id, "Updated question");
        Ok(question)
    }

    /// Delete a question with its options and answers.
    pub async fn delete_question(&self, id: i32) -> AppResult<()> {
        if self.question_repo.delete(id).await? == 0 {
            return Err(AppError::NotFound(format!("Question not found: {id}")));
        }
        Ok(())
    }

    /// Add an option to a choice question; numbers are unique within it.
    pub async fn add_option(
        &self,
        question_id: i32,
        input: CreateOptionInput,
    ) -> AppResult<poll_option::Model> {
        input.validate()?;
        let question = self.get_question(question_id).await?;
        if !question.question_type.is_choice() {
            return Err(AppError::BadRequest(
                "Text questions do not take options".to_string(),
            ));
        }

        let model = poll_option::ActiveModel {
            question_id: Set(question_id),
            number: Set(input.number),
            text: Set(input.text),
            ..Default::default()
        };
        self.option_repo.create(model).await
    }

    /// Edit an option; a number taken within its question is a conflict.
    pub async fn update_option(
        &self,
        id: i32,
        input: UpdateOptionInput,
    ) -> AppResult<poll_option::Model> {
        input.validate()?;
        let option = self
            .option_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Option not found: {id}")))?;

        let mut active: poll_option::ActiveModel = option.into();
        if let Some(number) = input.number {
            active.number = Set(number);
        }
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        self.option_repo.update(active).await
    }

    async fn get_question(&self, id: i32) -> AppResult<question::Model> {
        self.question_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))
    }

    /// Delete an option.
    pub async fn delete_option(&self, id: i32) -> AppResult<()> {
        if self.option_repo.delete(id).await? == 0 {
            return Err(AppError::NotFound(format!("Option not found: {id}")));
        }
        Ok(())
    }
}
