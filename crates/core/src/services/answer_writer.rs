//! Answer persistence.
//!
//! Answers are found or created by `(user, question, text)` inside one
//! transaction. Options of a repeated submission are merged into the
//! existing row. A concurrent insert of the same key trips the unique
//! index and is retried once, which then finds the winner's row.

use pollapi_common::{AppError, AppResult};
use pollapi_db::{
    entities::{answer, poll_option},
    repositories::AnswerRepository,
};
use sea_orm::Set;

use super::answer_validator::ValidatedAnswer;

/// Union of already attached option ids and newly selected options.
///
/// Existing ids keep their order; new ids not yet present are appended in
/// the order given.
#[must_use]
pub fn merge_options_into(existing: &[i32], new: &[poll_option::Model]) -> Vec<i32> {
    let mut merged = existing.to_vec();
    for option in new {
        if !merged.contains(&option.id) {
            merged.push(option.id);
        }
    }
    merged
}

/// Outcome of a write.
#[derive(Debug, Clone)]
pub struct WrittenAnswer {
    pub answer: answer::Model,
    /// Every option attached to the answer after the write.
    pub option_ids: Vec<i32>,
    /// Whether a new row was inserted.
    pub created: bool,
}

/// Persists validated answers.
#[derive(Clone)]
pub struct AnswerWriter {
    answer_repo: AnswerRepository,
}

impl AnswerWriter {
    /// Create a new answer writer.
    #[must_use]
    pub const fn new(answer_repo: AnswerRepository) -> Self {
        Self { answer_repo }
    }

    /// Write a validated answer, merging into an existing row when present.
    pub async fn write(&self, validated: &ValidatedAnswer) -> AppResult<WrittenAnswer> {
        match self.try_write(validated).await {
            Err(AppError::Conflict(detail)) => {
                tracing::warn!(
                    user_id = %validated.user.id,
                    question_id = validated.question.id,
                    %detail,
                    "Concurrent answer insert, retrying as merge"
                );
                match self.try_write(validated).await {
                    Err(AppError::Conflict(detail)) => Err(AppError::Internal(format!(
                        "Answer conflict persisted after retry: {detail}"
                    ))),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn try_write(&self, validated: &ValidatedAnswer) -> AppResult<WrittenAnswer> {
        let txn = self.answer_repo.begin().await?;

        let existing = self
            .answer_repo
            .find_by_key(&txn, &validated.user.id, validated.question.id, &validated.text)
            .await?;

        let (answer, attached, created) = match existing {
            Some(answer) => {
                let attached = self.answer_repo.find_option_ids(&txn, answer.id).await?;
                (answer, attached, false)
            }
            None => {
                let model = answer::ActiveModel {
                    user_id: Set(Some(validated.user.id.clone())),
                    question_id: Set(validated.question.id),
                    text: Set(validated.text.clone()),
                    ..Default::default()
                };
                let answer = self.answer_repo.create(&txn, model).await?;
                (answer, vec![], true)
            }
        };

        let option_ids = merge_options_into(&attached, &validated.options);
        let added: Vec<i32> = option_ids
            .iter()
            .copied()
            .filter(|id| !attached.contains(id))
            .collect();
        self.answer_repo
            .attach_options(&txn, answer.id, &added)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            answer_id = answer.id,
            question_id = answer.question_id,
            created,
            added = added.len(),
            "Answer written"
        );

        Ok(WrittenAnswer {
            answer,
            option_ids,
            created,
        })
    }
}
