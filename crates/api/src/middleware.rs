//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use pollapi_common::AppError;
use pollapi_core::{AnswerService, PollService, ReportService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub poll_service: PollService,
    pub answer_service: AnswerService,
    pub report_service: ReportService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user row and stores it in
/// the request extensions. Requests without a valid token pass through
/// anonymously; endpoints that need a user reject them via the extractor.
/// A failed lookup ends the request with a server error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => {
                tracing::debug!("Rejected unknown bearer token");
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
