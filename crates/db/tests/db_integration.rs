//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `pollapi_test`)
//!   `TEST_DB_PASSWORD` (default: `pollapi_test`)
//!   `TEST_DB_NAME` (default: `pollapi_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use pollapi_common::AppError;
use pollapi_db::entities::{answer, question::QuestionType};
use pollapi_db::repositories::{
    AnswerRepository, PollOptionRepository, PollRepository, QuestionRepository,
};
use pollapi_db::test_utils::{
    TestDatabase, TestDbConfig, seed_option, seed_poll, seed_question, seed_user,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

fn answer_row(user_id: &str, question_id: i32, text: &str) -> answer::ActiveModel {
    answer::ActiveModel {
        user_id: Set(Some(user_id.to_string())),
        question_id: Set(question_id),
        text: Set(text.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_poll_window_is_checked_by_store() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let inverted = seed_poll(db.connection(), "Inverted", start, start, true).await;
    assert!(inverted.is_err(), "start == end must be rejected");

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_question_number_unique_per_poll() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc::now() - Duration::days(1);
    let poll = seed_poll(db.connection(), "Poll", start, start + Duration::days(2), true)
        .await
        .unwrap();
    seed_question(db.connection(), poll.id, 1, QuestionType::Text)
        .await
        .unwrap();

    let repo = QuestionRepository::new(Arc::new(db.conn.clone()));
    let duplicate = repo
        .create(pollapi_db::entities::question::ActiveModel {
            poll_id: Set(poll.id),
            number: Set(1),
            question_type: Set(QuestionType::OneChoice),
            text: Set("Again".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_renumbering_into_taken_number_is_conflict() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc::now() - Duration::days(1);
    let poll = seed_poll(db.connection(), "Poll", start, start + Duration::days(2), true)
        .await
        .unwrap();
    seed_question(db.connection(), poll.id, 1, QuestionType::OneChoice)
        .await
        .unwrap();
    let second = seed_question(db.connection(), poll.id, 2, QuestionType::OneChoice)
        .await
        .unwrap();
    seed_option(db.connection(), second.id, 1, "Yes").await.unwrap();
    let no = seed_option(db.connection(), second.id, 2, "No").await.unwrap();

    let conn = Arc::new(db.conn.clone());
    let mut question: pollapi_db::entities::question::ActiveModel = second.into();
    question.number = Set(1);
    let result = QuestionRepository::new(conn.clone()).update(question).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let mut option: pollapi_db::entities::poll_option::ActiveModel = no.into();
    option.number = Set(1);
    let result = PollOptionRepository::new(conn).update(option).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_answer_key_is_unique() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc::now() - Duration::days(1);
    let user = seed_user(db.connection(), "alice").await.unwrap();
    let poll = seed_poll(db.connection(), "Poll", start, start + Duration::days(2), true)
        .await
        .unwrap();
    let question = seed_question(db.connection(), poll.id, 1, QuestionType::Text)
        .await
        .unwrap();

    let repo = AnswerRepository::new(Arc::new(db.conn.clone()));
    repo.create(db.connection(), answer_row(&user.id, question.id, "hello"))
        .await
        .unwrap();
    let duplicate = repo
        .create(db.connection(), answer_row(&user.id, question.id, "hello"))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // A different text is a different key
    repo.create(db.connection(), answer_row(&user.id, question.id, "other"))
        .await
        .unwrap();

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_attach_options_skips_existing_pairs() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc::now() - Duration::days(1);
    let user = seed_user(db.connection(), "alice").await.unwrap();
    let poll = seed_poll(db.connection(), "Poll", start, start + Duration::days(2), true)
        .await
        .unwrap();
    let question = seed_question(db.connection(), poll.id, 1, QuestionType::MultiChoice)
        .await
        .unwrap();
    let first = seed_option(db.connection(), question.id, 1, "Red").await.unwrap();
    let second = seed_option(db.connection(), question.id, 2, "Blue").await.unwrap();

    let repo = AnswerRepository::new(Arc::new(db.conn.clone()));
    let answer = repo
        .create(db.connection(), answer_row(&user.id, question.id, ""))
        .await
        .unwrap();
    repo.attach_options(db.connection(), answer.id, &[first.id])
        .await
        .unwrap();
    repo.attach_options(db.connection(), answer.id, &[first.id, second.id])
        .await
        .unwrap();

    let mut ids = repo.find_option_ids(db.connection(), answer.id).await.unwrap();
    ids.sort_unstable();
    assert_eq!(ids, vec![first.id, second.id]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_delete_poll_cascades() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let start = Utc::now() - Duration::days(1);
    let user = seed_user(db.connection(), "alice").await.unwrap();
    let poll = seed_poll(db.connection(), "Poll", start, start + Duration::days(2), true)
        .await
        .unwrap();
    let question = seed_question(db.connection(), poll.id, 1, QuestionType::OneChoice)
        .await
        .unwrap();
    let option = seed_option(db.connection(), question.id, 1, "Yes").await.unwrap();
    let answer = answer_row(&user.id, question.id, "")
        .insert(db.connection())
        .await
        .unwrap();
    pollapi_db::entities::answer_option::ActiveModel {
        answer_id: Set(answer.id),
        option_id: Set(option.id),
    }
    .insert(db.connection())
    .await
    .unwrap();

    PollRepository::new(Arc::new(db.conn.clone()))
        .delete(poll.id)
        .await
        .unwrap();

    let remaining = pollapi_db::entities::Answer::find()
        .all(db.connection())
        .await
        .unwrap();
    assert!(remaining.is_empty());
    let links = pollapi_db::entities::AnswerOption::find()
        .all(db.connection())
        .await
        .unwrap();
    assert!(links.is_empty());

    db.drop_database().await.unwrap();
}

/// Completion membership over many polls, checked against a known layout.
///
/// Even polls are answered in full, odd polls miss their last question,
/// and one extra poll has no questions at all.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_completed_ids_at_scale() {
    const POLLS: i64 = 200;
    const QUESTIONS: i32 = 3;

    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let conn = db.connection();
    let user = seed_user(conn, "alice").await.unwrap();
    let other = seed_user(conn, "bob").await.unwrap();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let mut expected = Vec::new();
    for i in 0..POLLS {
        // Later polls start earlier so ordering by start date reverses ids
        let start = base - Duration::hours(i);
        let poll = seed_poll(conn, &format!("Poll {i}"), start, start + Duration::days(30), true)
            .await
            .unwrap();
        let complete = i % 2 == 0;
        for number in 1..=QUESTIONS {
            let question = seed_question(conn, poll.id, number, QuestionType::Text)
                .await
                .unwrap();
            if complete || number < QUESTIONS {
                answer_row(&user.id, question.id, "yes")
                    .insert(conn)
                    .await
                    .unwrap();
            }
            // Another user's answers never count towards completion
            answer_row(&other.id, question.id, "no")
                .insert(conn)
                .await
                .unwrap();
        }
        if complete {
            expected.push(poll.id);
        }
    }
    seed_poll(conn, "Empty", base, base + Duration::days(1), true)
        .await
        .unwrap();
    expected.reverse();

    let repo = PollRepository::new(Arc::new(db.conn.clone()));
    let completed = repo.find_completed_ids(conn, &user.id).await.unwrap();
    assert_eq!(completed, expected);

    let stats = conn
        .query_one(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT COUNT(*)::int AS n FROM answer".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let rows: i32 = stats.try_get("", "n").unwrap();
    assert!(rows > POLLS as i32 * QUESTIONS);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
