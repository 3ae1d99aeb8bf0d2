//! Completion report.
//!
//! Lists the polls a user has answered in full. Membership comes from a
//! single aggregate query; the per-question views are then assembled from
//! a fixed number of batched reads, independent of how many polls match.

use std::collections::HashMap;

use pollapi_common::{AppError, AppResult};
use pollapi_db::{
    entities::{answer, poll, poll_option, question, question::QuestionType, user},
    repositories::{AnswerRepository, PollOptionRepository, PollRepository, QuestionRepository},
};

/// One question of a completed poll with the user's answer rendered.
#[derive(Debug, Clone)]
pub struct QuestionReport {
    pub question: question::Model,
    /// Options ordered by number.
    pub options: Vec<poll_option::Model>,
    /// Stored text for text questions, selected options otherwise.
    pub answer: String,
}

/// A completed poll.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub poll: poll::Model,
    pub questions: Vec<QuestionReport>,
}

/// Builds the completed-polls report.
#[derive(Clone)]
pub struct ReportService {
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    option_repo: PollOptionRepository,
    answer_repo: AnswerRepository,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        option_repo: PollOptionRepository,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            poll_repo,
            question_repo,
            option_repo,
            answer_repo,
        }
    }

    /// Polls where `user` has an answer for every question, by start date.
    ///
    /// Membership and the batched reads share one snapshot, so questions
    /// added concurrently cannot make a listed poll look incomplete.
    pub async fn completed_polls(&self, user: &user::Model) -> AppResult<Vec<PollReport>> {
        let txn = self.poll_repo.begin_snapshot().await?;
        let poll_ids = self.poll_repo.find_completed_ids(&txn, &user.id).await?;
        if poll_ids.is_empty() {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(vec![]);
        }

        let polls = self.poll_repo.find_by_ids(&txn, &poll_ids).await?;
        let questions = self.question_repo.find_by_polls(&txn, &poll_ids).await?;
        let question_ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
        let options = self
            .option_repo
            .find_by_questions(&txn, &question_ids)
            .await?;
        let answers = self
            .answer_repo
            .find_by_user_and_questions(&txn, &user.id, &question_ids)
            .await?;
        let answer_ids: Vec<i32> = answers.iter().map(|a| a.id).collect();
        let selected = self
            .answer_repo
            .find_selected_options(&txn, &answer_ids)
            .await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            user_id = %user.id,
            polls = polls.len(),
            questions = questions.len(),
            "Assembling completion report"
        );

        assemble_reports(polls, questions, options, &answers, selected)
    }
}

/// Group batched rows into reports, keeping the order of `polls`.
///
/// Every question must have at least one answer in `answers`; a missing
/// one means the completion query and the stored rows disagree.
pub fn assemble_reports(
    polls: Vec<poll::Model>,
    questions: Vec<question::Model>,
    options: Vec<poll_option::Model>,
    answers: &[answer::Model],
    selected: Vec<(i32, poll_option::Model)>,
) -> AppResult<Vec<PollReport>> {
    let mut options_by_question: HashMap<i32, Vec<poll_option::Model>> = HashMap::new();
    for option in options {
        options_by_question
            .entry(option.question_id)
            .or_default()
            .push(option);
    }

    let mut answers_by_question: HashMap<i32, Vec<&answer::Model>> = HashMap::new();
    for answer in answers {
        answers_by_question
            .entry(answer.question_id)
            .or_default()
            .push(answer);
    }

    let mut selected_by_answer: HashMap<i32, Vec<poll_option::Model>> = HashMap::new();
    for (answer_id, option) in selected {
        selected_by_answer.entry(answer_id).or_default().push(option);
    }

    let mut questions_by_poll: HashMap<i32, Vec<question::Model>> = HashMap::new();
    for question in questions {
        questions_by_poll
            .entry(question.poll_id)
            .or_default()
            .push(question);
    }

    polls
        .into_iter()
        .map(|poll| {
            let mut questions = questions_by_poll.remove(&poll.id).unwrap_or_default();
            questions.sort_by_key(|q| (q.number, q.id));

            let questions = questions
                .into_iter()
                .map(|question| {
                    let answers = answers_by_question
                        .get(&question.id)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let answer = render_answer(&question, answers, &selected_by_answer)?;
                    let mut options =
                        options_by_question.remove(&question.id).unwrap_or_default();
                    options.sort_by_key(|o| (o.number, o.id));
                    Ok(QuestionReport {
                        question,
                        options,
                        answer,
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;

            Ok(PollReport { poll, questions })
        })
        .collect()
}

fn render_answer(
    question: &question::Model,
    answers: &[&answer::Model],
    selected_by_answer: &HashMap<i32, Vec<poll_option::Model>>,
) -> AppResult<String> {
    if answers.is_empty() {
        return Err(AppError::Internal(format!(
            "Question {} of completed poll {} has no answer",
            question.id, question.poll_id
        )));
    }

    match question.question_type {
        QuestionType::Text => {
            if answers.len() > 1 {
                tracing::debug!(
                    question_id = question.id,
                    rows = answers.len(),
                    "Several text answers for one question, showing the latest"
                );
            }
            let latest = answers.iter().max_by_key(|a| a.id);
            Ok(latest.map(|a| a.text.clone()).unwrap_or_default())
        }
        QuestionType::OneChoice | QuestionType::MultiChoice => {
            let mut chosen: Vec<&poll_option::Model> = answers
                .iter()
                .filter_map(|a| selected_by_answer.get(&a.id))
                .flatten()
                .collect();
            chosen.sort_by_key(|o| (o.number, o.id));
            chosen.dedup_by_key(|o| o.id);
            Ok(chosen
                .iter()
                .map(|o| o.display())
                .collect::<Vec<_>>()
                .join(" | "))
        }
    }
}
