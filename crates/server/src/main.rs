//! pollapi server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware, routing::get};
use pollapi_api::{endpoints::health, middleware::AppState, router as api_router};
use pollapi_common::Config;
use pollapi_core::{
    AnswerService, AnswerValidator, AnswerWriter, PollService, ReportService, UserService,
};
use pollapi_db::repositories::{
    AnswerRepository, PollOptionRepository, PollRepository, QuestionRepository, UserRepository,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pollapi=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting pollapi server...");

    let config = Config::load()?;

    let db = pollapi_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    pollapi_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let option_repo = PollOptionRepository::new(Arc::clone(&db));
    let answer_repo = AnswerRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo);
    let poll_service = PollService::new(
        poll_repo.clone(),
        question_repo.clone(),
        option_repo.clone(),
    );
    let validator = AnswerValidator::new(
        question_repo.clone(),
        poll_repo.clone(),
        option_repo.clone(),
    );
    let writer = AnswerWriter::new(answer_repo.clone());
    let answer_service = AnswerService::new(validator, writer, answer_repo.clone());
    let report_service = ReportService::new(poll_repo, question_repo, option_repo, answer_repo);

    if let Some(username) = config.bootstrap.admin_username.as_deref() {
        user_service
            .ensure_bootstrap_admin(username, config.bootstrap.admin_token.as_deref())
            .await?;
    }

    let state = AppState {
        user_service,
        poll_service,
        answer_service,
        report_service,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            pollapi_api::middleware::auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
