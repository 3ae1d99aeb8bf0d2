//! Administration endpoints.
//!
//! Every handler requires an authenticated administrator.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use pollapi_common::{AppResult, format_date};
use pollapi_core::{
    AnswerListItem, CreateOptionInput, CreatePollInput, CreateQuestionInput, CreateUserInput,
    PollDetail, UpdateOptionInput, UpdatePollInput, UpdateQuestionInput,
};
use pollapi_db::entities::{poll, poll_option, question, user};
use serde::{Deserialize, Serialize};

use super::polls::{OptionResponse, PollDetailResponse, PollResponse, QuestionResponse};
use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, created, ok},
};

const DEFAULT_ANSWER_LIMIT: u64 = 100;
const MAX_ANSWER_LIMIT: u64 = 1000;

/// Poll as shown to administrators, including its publication flag.
#[derive(Debug, Serialize)]
pub struct AdminPollResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub is_ready: bool,
}

impl From<poll::Model> for AdminPollResponse {
    fn from(poll: poll::Model) -> Self {
        Self {
            is_ready: poll.is_ready,
            poll: poll.into(),
        }
    }
}

/// Poll detail as shown to administrators.
#[derive(Debug, Serialize)]
pub struct AdminPollDetailResponse {
    #[serde(flatten)]
    pub detail: PollDetailResponse,
    pub is_ready: bool,
}

impl From<PollDetail> for AdminPollDetailResponse {
    fn from(detail: PollDetail) -> Self {
        Self {
            is_ready: detail.poll.is_ready,
            detail: detail.into(),
        }
    }
}

/// Answer as listed for administrators.
#[derive(Debug, Serialize)]
pub struct AdminAnswerResponse {
    pub id: i32,
    pub user: Option<String>,
    pub question: i32,
    pub text: String,
    /// Selected options, e.g. `(1) Red | (3) Green`
    pub options: String,
}

impl From<AnswerListItem> for AdminAnswerResponse {
    fn from(item: AnswerListItem) -> Self {
        Self {
            id: item.answer.id,
            user: item.answer.user_id,
            question: item.answer.question_id,
            text: item.answer.text,
            options: item.options,
        }
    }
}

/// Created user, including the access token.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub id: String,
    pub username: String,
    pub token: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<user::Model> for CreatedUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            created_at: format_date(&user.created_at),
            id: user.id,
            username: user.username,
            token: user.token,
            is_admin: user.is_admin,
        }
    }
}

/// Answer listing filter.
#[derive(Debug, Deserialize)]
pub struct ListAnswersQuery {
    pub user: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

fn question_response(question: question::Model) -> QuestionResponse {
    QuestionResponse::new(question, vec![])
}

fn option_response(option: poll_option::Model) -> OptionResponse {
    option.into()
}

async fn list_polls(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AdminPollResponse>>> {
    let polls = state.poll_service.list_all().await?;
    Ok(ApiResponse::ok(polls.into_iter().map(Into::into).collect()))
}

async fn create_poll(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePollInput>,
) -> AppResult<impl IntoResponse> {
    let poll = state.poll_service.create_poll(input).await?;
    tracing::debug!(admin_id = %admin.id, poll_id = poll.id, "Admin created poll");
    Ok(created(AdminPollResponse::from(poll)))
}

async fn show_poll(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<AdminPollDetailResponse>> {
    let detail = state.poll_service.get_detail(id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

async fn update_poll(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdatePollInput>,
) -> AppResult<ApiResponse<AdminPollResponse>> {
    let poll = state.poll_service.update_poll(id, input).await?;
    Ok(ApiResponse::ok(poll.into()))
}

async fn delete_poll(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.poll_service.delete_poll(id).await?;
    Ok(ok())
}

async fn create_question(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(poll_id): Path<i32>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<impl IntoResponse> {
    let question = state.poll_service.add_question(poll_id, input).await?;
    Ok(created(question_response(question)))
}

async fn update_question(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateQuestionInput>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let question = state.poll_service.update_question(id, input).await?;
    Ok(ApiResponse::ok(question_response(question)))
}

async fn delete_question(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.poll_service.delete_question(id).await?;
    Ok(ok())
}

async fn create_option(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
    Json(input): Json<CreateOptionInput>,
) -> AppResult<impl IntoResponse> {
    let option = state.poll_service.add_option(question_id, input).await?;
    Ok(created(option_response(option)))
}

async fn update_option(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateOptionInput>,
) -> AppResult<ApiResponse<OptionResponse>> {
    let option = state.poll_service.update_option(id, input).await?;
    Ok(ApiResponse::ok(option_response(option)))
}

async fn delete_option(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.poll_service.delete_option(id).await?;
    Ok(ok())
}

async fn list_answers(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListAnswersQuery>,
) -> AppResult<ApiResponse<Vec<AdminAnswerResponse>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ANSWER_LIMIT)
        .clamp(1, MAX_ANSWER_LIMIT);
    let answers = state
        .answer_service
        .list(query.user.as_deref(), limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(answers.into_iter().map(Into::into).collect()))
}

async fn create_user(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_service.create(input).await?;
    Ok(created(CreatedUserResponse::from(user)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/polls", get(list_polls).post(create_poll))
        .route(
            "/polls/{id}",
            get(show_poll).patch(update_poll).delete(delete_poll),
        )
        .route("/polls/{id}/questions", post(create_question))
        .route(
            "/questions/{id}",
            patch(update_question).delete(delete_question),
        )
        .route("/questions/{id}/options", post(create_option))
        .route("/options/{id}", patch(update_option).delete(delete_option))
        .route("/answers", get(list_answers))
        .route("/users", post(create_user))
}
