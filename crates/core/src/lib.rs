//! Core business logic for pollapi.
//!
//! - **Availability**: whether a poll is open for answering right now
//! - **Answer validation**: shape, availability and ownership checks
//! - **Answer writing**: transactional find-or-create with option merging
//! - **Reporting**: the per-user "completed polls" report
//! - **Administration**: poll, question, option and user management

pub mod services;

pub use services::*;
