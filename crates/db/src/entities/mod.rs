//! Database entities.

pub mod answer;
pub mod answer_option;
pub mod poll;
pub mod poll_option;
pub mod question;
pub mod user;

pub use answer::Entity as Answer;
pub use answer_option::Entity as AnswerOption;
pub use poll::Entity as Poll;
pub use poll_option::Entity as PollOption;
pub use question::Entity as Question;
pub use user::Entity as User;
