//! Answer submission endpoint.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use pollapi_common::AppResult;
use pollapi_core::{AnswerSubmission, WrittenAnswer};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::created};

/// Stored answer response.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: i32,
    pub question: i32,
    pub option: Vec<i32>,
    pub text: String,
}

impl From<WrittenAnswer> for AnswerResponse {
    fn from(written: WrittenAnswer) -> Self {
        Self {
            id: written.answer.id,
            question: written.answer.question_id,
            option: written.option_ids,
            text: written.answer.text,
        }
    }
}

/// Submit an answer to one question of an active poll.
async fn submit_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(submission): Json<AnswerSubmission>,
) -> AppResult<impl IntoResponse> {
    let written = state.answer_service.submit(&user, &submission).await?;
    Ok(created(AnswerResponse::from(written)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/answer", post(submit_answer))
}
