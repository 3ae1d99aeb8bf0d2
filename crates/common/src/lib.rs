//! Common utilities and shared types for pollapi.
//!
//! This crate provides foundational components used across all pollapi crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and access tokens via [`IdGenerator`]
//! - **Formatting**: The wire date format shared by every poll payload
//!
//! # Example
//!
//! ```no_run
//! use pollapi_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let token = id_gen.generate_token();
//!     println!("Listening on port {} with token {}", config.server.port, token);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use format::{DATE_FORMAT, format_date, parse_date};
pub use id::IdGenerator;
