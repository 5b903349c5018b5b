//! Survey — schema, answers, and the step-by-step session.
//!
//! A survey is an ordered list of steps. The session walks them one at a
//! time, only letting the user move forward once every question on the
//! current step has an answer. Once the last step is submitted the answers
//! are turned into a prompt for proposal generation.

pub mod answers;
pub mod prompts;
pub mod schema;
pub mod state;

pub use answers::{AnswerStore, StepAnswers};
pub use prompts::{NO_RESPONSE, build_prompt};
pub use schema::{Question, QuestionKind, Step, SurveySchema};
pub use state::{SurveySession, Transition, is_step_complete};
