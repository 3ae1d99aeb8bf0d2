//! Completion report endpoint.

use axum::{Router, extract::State, routing::get};
use pollapi_common::AppResult;
use pollapi_core::{PollReport, QuestionReport};
use serde::Serialize;

use super::polls::{PollResponse, QuestionResponse};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A question with the caller's rendered answer.
#[derive(Debug, Serialize)]
pub struct AnsweredQuestionResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub answer: String,
}

impl From<QuestionReport> for AnsweredQuestionResponse {
    fn from(report: QuestionReport) -> Self {
        Self {
            question: QuestionResponse::new(report.question, report.options),
            answer: report.answer,
        }
    }
}

/// A fully answered poll.
#[derive(Debug, Serialize)]
pub struct CompletedPollResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub questions: Vec<AnsweredQuestionResponse>,
}

impl From<PollReport> for CompletedPollResponse {
    fn from(report: PollReport) -> Self {
        Self {
            poll: report.poll.into(),
            questions: report.questions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Polls the caller has answered in full.
async fn my_polls(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CompletedPollResponse>>> {
    let reports = state.report_service.completed_polls(&user).await?;
    Ok(ApiResponse::ok(reports.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/my_polls", get(my_polls))
}
