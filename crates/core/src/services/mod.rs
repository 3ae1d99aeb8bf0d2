//! Business logic services.

#![allow(missing_docs)]

pub mod answer;
pub mod answer_validator;
pub mod answer_writer;
pub mod availability;
pub mod poll;
pub mod report;
pub mod user;

pub use answer::{AnswerListItem, AnswerService};
pub use answer_validator::{AnswerSubmission, AnswerValidator, Rejection, ValidatedAnswer};
pub use answer_writer::{AnswerWriter, WrittenAnswer, merge_options_into};
pub use availability::is_active;
pub use poll::{
    CreateOptionInput, CreatePollInput, CreateQuestionInput, PollDetail, PollService,
    QuestionWithOptions, UpdateOptionInput, UpdatePollInput, UpdateQuestionInput,
};
pub use report::{PollReport, QuestionReport, ReportService};
pub use user::{CreateUserInput, UserService};
