//! User service.

use chrono::Utc;
use pollapi_common::{AppError, AppResult, IdGenerator};
use pollapi_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for authentication and account management.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Create a user with a generated id and access token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;
        self.insert(input.username, None, input.is_admin).await
    }

    /// Make sure the configured administrator exists.
    ///
    /// An existing account with that username is left untouched. When no
    /// token is configured one is generated and logged once.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(username).await? {
            tracing::debug!(username, "Bootstrap admin already present");
            return Ok(existing);
        }

        let user = self
            .insert(username.to_string(), token.map(str::to_string), true)
            .await?;
        if token.is_none() {
            tracing::warn!(
                username,
                token = user.token.as_deref().unwrap_or_default(),
                "Generated token for bootstrap admin"
            );
        }
        Ok(user)
    }

    async fn insert(
        &self,
        username: String,
        token: Option<String>,
        is_admin: bool,
    ) -> AppResult<user::Model> {
        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username already taken: {username}"
            )));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username),
            token: Set(Some(token.unwrap_or_else(|| self.id_gen.generate_token()))),
            is_admin: Set(is_admin),
            created_at: Set(Utc::now().into()),
        };
        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, username = %user.username, is_admin, "Created user");
        Ok(user)
    }
}
