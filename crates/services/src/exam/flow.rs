use std::sync::Arc;

use rand::rng;

use exam_core::Clock;
use exam_core::model::{ExamOutcome, ExamRules, OptionLetter, Question};
use storage::repository::HistoryRepository;

use super::history::RecentExams;
use super::plan::ExamPlanner;
use super::session::ExamSession;
use crate::error::ExamError;

/// Result of confirming a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamStepResult {
    pub is_complete: bool,
}

/// Orchestrates exam composition, answering and grading.
#[derive(Clone)]
pub struct ExamFlow {
    clock: Clock,
    rules: ExamRules,
    recent: RecentExams,
}

impl ExamFlow {
    #[must_use]
    pub fn new(clock: Clock, rules: ExamRules, history: Arc<dyn HistoryRepository>) -> Self {
        Self {
            clock,
            rules,
            recent: RecentExams::new(history),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &ExamRules {
        &self.rules
    }

    /// Compose a fresh exam from the question pool and start a session.
    ///
    /// The recent-exam ledger is read once to build the avoidance set and
    /// written once with the new selection; both accesses are best-effort.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::InsufficientQuestions` when the pool cannot
    /// satisfy the section quotas.
    pub async fn start_exam(&self, pool: &[Question]) -> Result<ExamSession, ExamError> {
        let avoid = self.recent.avoid_keys().await;
        let plan = ExamPlanner::new(&self.rules).compose(pool, &avoid, &mut rng())?;
        self.recent.record(&plan.questions).await;
        Ok(ExamSession::new(
            plan,
            self.rules.clone(),
            self.clock.now(),
        ))
    }

    /// Record the chosen letter for the current question and confirm it.
    ///
    /// This is the single user-facing answer step: record then advance.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Completed` when the session is already finished.
    pub fn submit_answer(
        &self,
        session: &mut ExamSession,
        letter: OptionLetter,
    ) -> Result<ExamStepResult, ExamError> {
        session.record_answer(letter)?;
        let is_complete = session.advance(self.clock.now())?;
        Ok(ExamStepResult { is_complete })
    }

    /// Complete the session in response to the external time's-up signal.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Completed` if the session already finished.
    pub fn finish_expired(&self, session: &mut ExamSession) -> Result<(), ExamError> {
        session.expire(self.clock.now())
    }

    /// Grade a completed session.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotComplete` on an unfinished session.
    pub fn outcome(&self, session: &ExamSession) -> Result<ExamOutcome, ExamError> {
        session.outcome()
    }
}
