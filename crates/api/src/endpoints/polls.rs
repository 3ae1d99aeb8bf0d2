//! Active poll endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use chrono::Utc;
use pollapi_common::{AppResult, format_date};
use pollapi_core::{PollDetail, QuestionWithOptions};
use pollapi_db::entities::{poll, poll_option, question};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Poll as shown to users.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub id: i32,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl From<poll::Model> for PollResponse {
    fn from(poll: poll::Model) -> Self {
        Self {
            id: poll.id,
            name: poll.name,
            start_date: format_date(&poll.start_date),
            end_date: format_date(&poll.end_date),
            description: poll.description,
        }
    }
}

/// Option response.
#[derive(Debug, Serialize)]
pub struct OptionResponse {
    pub id: i32,
    pub number: i32,
    pub text: String,
}

impl From<poll_option::Model> for OptionResponse {
    fn from(option: poll_option::Model) -> Self {
        Self {
            id: option.id,
            number: option.number,
            text: option.text,
        }
    }
}

/// Question response.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i32,
    pub number: i32,
    pub question_type: &'static str,
    pub text: String,
    pub options: Vec<OptionResponse>,
}

impl QuestionResponse {
    /// Build from a question and its options, already ordered by number.
    pub fn new(question: question::Model, options: Vec<poll_option::Model>) -> Self {
        Self {
            id: question.id,
            number: question.number,
            question_type: question.question_type.label(),
            text: question.text,
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<QuestionWithOptions> for QuestionResponse {
    fn from(item: QuestionWithOptions) -> Self {
        Self::new(item.question, item.options)
    }
}

/// Poll with its questions.
#[derive(Debug, Serialize)]
pub struct PollDetailResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub questions: Vec<QuestionResponse>,
}

impl From<PollDetail> for PollDetailResponse {
    fn from(detail: PollDetail) -> Self {
        Self {
            poll: detail.poll.into(),
            questions: detail.questions.into_iter().map(Into::into).collect(),
        }
    }
}

/// List polls open for answering.
async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PollResponse>>> {
    let polls = state.poll_service.list_active(Utc::now()).await?;
    Ok(ApiResponse::ok(polls.into_iter().map(Into::into).collect()))
}

/// Show one open poll with its questions and options.
async fn show_active(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<PollDetailResponse>> {
    let detail = state.poll_service.get_active_detail(id, Utc::now()).await?;
    Ok(ApiResponse::ok(detail.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active_polls", get(list_active))
        .route("/active_polls/{id}", get(show_active))
}
