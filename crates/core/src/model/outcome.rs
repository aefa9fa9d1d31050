use thiserror::Error;

use crate::model::question::{OptionLetter, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutcomeError {
    #[error("answer count ({answers}) does not match question count ({questions})")]
    CountMismatch { questions: usize, answers: usize },

    #[error("priority section ({priority_len}) exceeds question count ({questions})")]
    InvalidSectionSplit {
        questions: usize,
        priority_len: usize,
    },
}

//
// ─── PER-QUESTION REVIEW ───────────────────────────────────────────────────────
//

/// Grading of a single question, in selection order.
///
/// `chosen` is `None` when the question was never answered; such questions
/// grade as incorrect rather than as a separate ungraded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerReview {
    pub chosen: Option<OptionLetter>,
    pub correct: OptionLetter,
    pub is_correct: bool,
}

/// Correct/error tallies for one exam section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionScore {
    pub correct: usize,
    pub errors: usize,
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Graded result of a completed exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamOutcome {
    reviews: Vec<AnswerReview>,
    priority: SectionScore,
    general: SectionScore,
    passed: bool,
    time_expired: bool,
}

impl ExamOutcome {
    /// Grades a completed answer sheet.
    ///
    /// The first `priority_len` questions form the priority section, which
    /// must be answered without error; the remaining questions tolerate up
    /// to `allowed_general_errors` mistakes. Both gates are evaluated
    /// independently and both must hold for a pass: a single priority error
    /// fails the exam regardless of the total score.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::CountMismatch` if `answers` is not the same
    /// length as `questions`, or `OutcomeError::InvalidSectionSplit` if
    /// `priority_len` exceeds the question count.
    pub fn grade(
        questions: &[Question],
        answers: &[Option<OptionLetter>],
        priority_len: usize,
        allowed_general_errors: usize,
        time_expired: bool,
    ) -> Result<Self, OutcomeError> {
        if answers.len() != questions.len() {
            return Err(OutcomeError::CountMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }
        if priority_len > questions.len() {
            return Err(OutcomeError::InvalidSectionSplit {
                questions: questions.len(),
                priority_len,
            });
        }

        let reviews: Vec<AnswerReview> = questions
            .iter()
            .zip(answers.iter())
            .map(|(question, chosen)| AnswerReview {
                chosen: *chosen,
                correct: question.correct(),
                is_correct: chosen.is_some_and(|letter| question.is_correct(letter)),
            })
            .collect();

        let priority = tally(&reviews[..priority_len]);
        let general = tally(&reviews[priority_len..]);
        let passed = priority.errors == 0 && general.errors <= allowed_general_errors;

        Ok(Self {
            reviews,
            priority,
            general,
            passed,
            time_expired,
        })
    }

    /// Per-question reviews in the order the questions were presented.
    #[must_use]
    pub fn reviews(&self) -> &[AnswerReview] {
        &self.reviews
    }

    #[must_use]
    pub fn priority(&self) -> SectionScore {
        self.priority
    }

    #[must_use]
    pub fn general(&self) -> SectionScore {
        self.general
    }

    #[must_use]
    pub fn total_correct(&self) -> usize {
        self.priority.correct + self.general.correct
    }

    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.priority.errors + self.general.errors
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn time_expired(&self) -> bool {
        self.time_expired
    }
}

fn tally(reviews: &[AnswerReview]) -> SectionScore {
    let correct = reviews.iter().filter(|r| r.is_correct).count();
    SectionScore {
        correct,
        errors: reviews.len() - correct,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::ChoiceSet;
    use crate::model::ids::QuestionId;

    fn build_question(id: u64, category: &str) -> Question {
        Question::new(
            Some(QuestionId::new(id)),
            None,
            category,
            format!("Question {id}"),
            ChoiceSet::new("first", "second", "third"),
            OptionLetter::A,
        )
        .unwrap()
    }

    fn build_exam() -> Vec<Question> {
        let mut questions: Vec<Question> =
            (1..=4).map(|id| build_question(id, "safety")).collect();
        questions.extend((5..=10).map(|id| build_question(id, "history")));
        questions
    }

    fn answer_sheet(wrong_positions: &[usize]) -> Vec<Option<OptionLetter>> {
        (0..10)
            .map(|idx| {
                if wrong_positions.contains(&idx) {
                    Some(OptionLetter::B)
                } else {
                    Some(OptionLetter::A)
                }
            })
            .collect()
    }

    #[test]
    fn all_correct_passes() {
        let outcome = ExamOutcome::grade(&build_exam(), &answer_sheet(&[]), 4, 1, false).unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.total_correct(), 10);
        assert_eq!(outcome.total_errors(), 0);
    }

    #[test]
    fn one_priority_error_fails_despite_good_total() {
        let outcome = ExamOutcome::grade(&build_exam(), &answer_sheet(&[2]), 4, 1, false).unwrap();
        assert!(!outcome.passed());
        assert_eq!(outcome.priority().errors, 1);
        assert_eq!(outcome.general().errors, 0);
        assert_eq!(outcome.total_correct(), 9);
    }

    #[test]
    fn one_general_error_still_passes() {
        let outcome = ExamOutcome::grade(&build_exam(), &answer_sheet(&[7]), 4, 1, false).unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.general().errors, 1);
    }

    #[test]
    fn two_general_errors_fail() {
        let outcome =
            ExamOutcome::grade(&build_exam(), &answer_sheet(&[7, 9]), 4, 1, false).unwrap();
        assert!(!outcome.passed());
        assert_eq!(outcome.priority().errors, 0);
        assert_eq!(outcome.general().errors, 2);
    }

    #[test]
    fn unanswered_questions_grade_as_incorrect() {
        let mut answers = answer_sheet(&[]);
        answers[5] = None;
        let outcome = ExamOutcome::grade(&build_exam(), &answers, 4, 1, false).unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.general().errors, 1);
        assert_eq!(outcome.reviews()[5].chosen, None);
        assert!(!outcome.reviews()[5].is_correct);
    }

    #[test]
    fn mismatched_answer_count_is_rejected() {
        let err = ExamOutcome::grade(&build_exam(), &answer_sheet(&[])[..9], 4, 1, false)
            .unwrap_err();
        assert_eq!(
            err,
            OutcomeError::CountMismatch {
                questions: 10,
                answers: 9
            }
        );
    }

    #[test]
    fn time_expired_flag_is_carried_through() {
        let outcome = ExamOutcome::grade(&build_exam(), &answer_sheet(&[]), 4, 1, true).unwrap();
        assert!(outcome.time_expired());
        assert!(outcome.passed());
    }
}
