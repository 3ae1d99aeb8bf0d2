//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases, plus
//! small fixture builders for polls and their children.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Set,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{poll, poll_option, question, question::QuestionType, user};
use crate::migrations::Migrator;

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "pollapi_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "pollapi_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "pollapi_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Get URL for connecting to postgres database (for creating test DB).
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A test database context that manages the lifecycle of a test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the shared test database.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect to a test database with custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self { conn, config })
    }

    /// Create a uniquely named, fully migrated database (for parallel tests).
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("pollapi_test_{}", &unique_suffix[..8]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;
        let create_db = format!("CREATE DATABASE \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, create_db))
            .await?;
        postgres_conn.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Created unique test database");

        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Truncate every application table, keeping the migration history.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                r#"TRUNCATE TABLE answer_option, answer, poll_option, question, poll, "user" RESTART IDENTITY CASCADE"#
                    .to_string(),
            ))
            .await?;

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop the test database (for unique databases).
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok(); // Ignore errors

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

/// Insert a user whose id, username and token are all `name`.
pub async fn seed_user<C: ConnectionTrait>(conn: &C, name: &str) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        id: Set(name.to_string()),
        username: Set(name.to_string()),
        token: Set(Some(name.to_string())),
        is_admin: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Insert a poll with the given window and readiness.
pub async fn seed_poll<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_ready: bool,
) -> Result<poll::Model, DbErr> {
    poll::ActiveModel {
        name: Set(name.to_string()),
        start_date: Set(start_date.into()),
        end_date: Set(end_date.into()),
        description: Set(String::new()),
        is_ready: Set(is_ready),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Insert a question into a poll.
pub async fn seed_question<C: ConnectionTrait>(
    conn: &C,
    poll_id: i32,
    number: i32,
    question_type: QuestionType,
) -> Result<question::Model, DbErr> {
    question::ActiveModel {
        poll_id: Set(poll_id),
        number: Set(number),
        question_type: Set(question_type),
        text: Set(format!("Question {number}")),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Insert an option into a question.
pub async fn seed_option<C: ConnectionTrait>(
    conn: &C,
    question_id: i32,
    number: i32,
    text: &str,
) -> Result<poll_option::Model, DbErr> {
    poll_option::ActiveModel {
        question_id: Set(question_id),
        number: Set(number),
        text: Set(text.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
}
