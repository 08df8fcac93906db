mod session;
mod state;
mod workflow;

pub use crate::error::QuizError;
pub use session::{Advance, AnswerOutcome, QuizSession};
pub use state::{QuizState, QuizSummary};
pub use workflow::{QuizAnswerResult, QuizLoopService};
