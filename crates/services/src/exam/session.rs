use std::fmt;

use chrono::{DateTime, Utc};

use exam_core::model::{ExamOutcome, ExamRules, OptionLetter, Question};

use super::plan::ExamPlan;
use super::progress::ExamProgress;
use crate::error::ExamError;

/// In-memory state of one exam attempt.
///
/// Steps through the composed questions in order; the answer for the
/// current question may be re-recorded until it is confirmed. Once the
/// cursor passes the last question (or the countdown expires) the session
/// is complete and can be graded. Abandoning an attempt is dropping the
/// value; there is no partial resume.
pub struct ExamSession {
    rules: ExamRules,
    questions: Vec<Question>,
    answers: Vec<Option<OptionLetter>>,
    cursor: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    time_expired: bool,
}

impl ExamSession {
    /// Create a session from a composed plan.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    #[must_use]
    pub fn new(plan: ExamPlan, rules: ExamRules, started_at: DateTime<Utc>) -> Self {
        let answers = vec![None; plan.questions.len()];
        Self {
            rules,
            questions: plan.questions,
            answers,
            cursor: 0,
            started_at,
            completed_at: None,
            time_expired: false,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &ExamRules {
        &self.rules
    }

    /// The composed questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn time_expired(&self) -> bool {
        self.time_expired
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        ExamProgress {
            position: self.cursor.min(self.questions.len()),
            total: self.questions.len(),
            answered: self.answered_count(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.cursor)
    }

    /// Record an answer for the current question, overwriting any earlier
    /// choice for it.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Completed` when there is no current question.
    pub fn record_answer(&mut self, letter: OptionLetter) -> Result<(), ExamError> {
        if self.current_question().is_none() {
            return Err(ExamError::Completed);
        }
        self.answers[self.cursor] = Some(letter);
        Ok(())
    }

    /// Confirm the current answer and move to the next question.
    ///
    /// Returns `true` when the session just completed. `now` should come
    /// from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotAnswered` if nothing was recorded for the
    /// current question, or `ExamError::Completed` on a finished session.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<bool, ExamError> {
        if self.is_complete() {
            return Err(ExamError::Completed);
        }
        if self.answers.get(self.cursor).copied().flatten().is_none() {
            return Err(ExamError::NotAnswered);
        }

        self.cursor += 1;
        if self.cursor >= self.questions.len() {
            self.completed_at = Some(now);
        }
        Ok(self.is_complete())
    }

    /// Complete the session because the countdown ran out.
    ///
    /// Questions that were never reached grade as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Completed` if the session already finished.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), ExamError> {
        if self.is_complete() {
            return Err(ExamError::Completed);
        }
        self.cursor = self.questions.len();
        self.completed_at = Some(now);
        self.time_expired = true;
        Ok(())
    }

    /// Grade the completed session.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotComplete` on an unfinished session.
    pub fn outcome(&self) -> Result<ExamOutcome, ExamError> {
        if !self.is_complete() {
            return Err(ExamError::NotComplete);
        }
        let outcome = ExamOutcome::grade(
            &self.questions,
            &self.answers,
            self.rules.priority_quota(),
            self.rules.allowed_general_errors(),
            self.time_expired,
        )?;
        Ok(outcome)
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("answered", &self.answered_count())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .field("time_expired", &self.time_expired)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ChoiceSet, QuestionId};
    use exam_core::time::fixed_now;

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

    fn build_session() -> ExamSession {
        let mut questions: Vec<Question> =
            (1..=4).map(|id| build_question(id, "safety")).collect();
        questions.extend((5..=10).map(|id| build_question(id, "equipment")));
        let plan = ExamPlan {
            priority_selected: 4,
            general_selected: 6,
            questions,
        };
        ExamSession::new(plan, ExamRules::default_for_licensing(), fixed_now())
    }

    #[test]
    fn advances_through_all_questions_and_completes() {
        let mut session = build_session();
        assert!(!session.is_complete());

        for step in 0..10 {
            assert_eq!(session.progress().position, step);
            session.record_answer(OptionLetter::A).unwrap();
            let done = session.advance(fixed_now()).unwrap();
            assert_eq!(done, step == 9);
        }

        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));
        assert!(session.current_question().is_none());
    }

    #[test]
    fn advance_without_answer_is_rejected() {
        let mut session = build_session();
        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, ExamError::NotAnswered));
    }

    #[test]
    fn recording_overwrites_previous_answer() {
        let mut session = build_session();
        session.record_answer(OptionLetter::B).unwrap();
        session.record_answer(OptionLetter::A).unwrap();
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.answered_count(), 1);

        while !session.is_complete() {
            session.record_answer(OptionLetter::A).unwrap();
            session.advance(fixed_now()).unwrap();
        }

        // Only the final recorded choice counts.
        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.total_correct(), 10);
    }

    #[test]
    fn outcome_is_rejected_before_completion() {
        let mut session = build_session();
        session.record_answer(OptionLetter::A).unwrap();
        session.advance(fixed_now()).unwrap();

        assert!(matches!(
            session.outcome().unwrap_err(),
            ExamError::NotComplete
        ));
    }

    #[test]
    fn operations_on_completed_session_are_rejected() {
        let mut session = build_session();
        session.expire(fixed_now()).unwrap();

        assert!(matches!(
            session.record_answer(OptionLetter::A).unwrap_err(),
            ExamError::Completed
        ));
        assert!(matches!(
            session.advance(fixed_now()).unwrap_err(),
            ExamError::Completed
        ));
        assert!(matches!(
            session.expire(fixed_now()).unwrap_err(),
            ExamError::Completed
        ));
    }

    #[test]
    fn expiry_completes_and_grades_unreached_questions_as_wrong() {
        let mut session = build_session();
        session.record_answer(OptionLetter::A).unwrap();
        session.advance(fixed_now()).unwrap();

        session.expire(fixed_now()).unwrap();
        let outcome = session.outcome().unwrap();

        assert!(outcome.time_expired());
        assert!(!outcome.passed());
        assert_eq!(outcome.total_correct(), 1);
        assert_eq!(outcome.total_errors(), 9);
    }

    #[test]
    fn full_correct_run_grades_as_pass() {
        let mut session = build_session();
        while !session.is_complete() {
            session.record_answer(OptionLetter::A).unwrap();
            session.advance(fixed_now()).unwrap();
        }

        let outcome = session.outcome().unwrap();
        assert!(outcome.passed());
        assert!(!outcome.time_expired());
    }
}
