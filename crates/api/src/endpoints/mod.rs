//! API endpoints.

#![allow(missing_docs)]

mod admin;
mod answers;
mod health;
mod polls;
mod reports;

use axum::Router;

use crate::middleware::AppState;

pub use health::health;
pub use polls::{OptionResponse, PollDetailResponse, PollResponse, QuestionResponse};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(polls::router())
        .merge(answers::router())
        .merge(reports::router())
        .nest("/admin", admin::router())
}
