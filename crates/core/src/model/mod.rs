mod ids;
mod outcome;
mod question;
mod rules;

pub use ids::{ParseIdError, QuestionId};
pub use outcome::{AnswerReview, ExamOutcome, OutcomeError, SectionScore};
pub use question::{ChoiceSet, OptionLetter, ParseLetterError, Question, QuestionError};
pub use rules::{ExamRules, RulesError};
