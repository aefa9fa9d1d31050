use std::collections::HashSet;
use std::sync::Arc;

use exam_core::model::Question;
use storage::repository::HistoryRepository;

/// Number of past exams whose questions are avoided on the next draw.
pub const RECENT_EXAM_LIMIT: usize = 10;

/// Best-effort ledger of recently composed exams.
///
/// Storage failures never surface to callers: a failed load degrades to an
/// empty history and a failed save leaves the engine fully functional
/// without history. Both are logged so a persistent problem is visible.
#[derive(Clone)]
pub struct RecentExams {
    repo: Arc<dyn HistoryRepository>,
}

impl RecentExams {
    #[must_use]
    pub fn new(repo: Arc<dyn HistoryRepository>) -> Self {
        Self { repo }
    }

    /// Stored exams, most recent first, capped at `RECENT_EXAM_LIMIT`.
    async fn load(&self) -> Vec<Vec<String>> {
        let mut sessions = match self.repo.load_recent().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load recent exams, treating history as empty");
                Vec::new()
            }
        };
        sessions.truncate(RECENT_EXAM_LIMIT);
        sessions
    }

    /// Union of the question keys used across all stored exams.
    pub async fn avoid_keys(&self) -> HashSet<String> {
        self.load().await.into_iter().flatten().collect()
    }

    /// Remember the questions of a freshly composed exam.
    ///
    /// Questions without a derivable key are skipped; if none remain, the
    /// ledger is left untouched. The stored list is capped at
    /// `RECENT_EXAM_LIMIT`, dropping the oldest entries.
    pub async fn record(&self, questions: &[Question]) {
        let keys: Vec<String> = questions.iter().filter_map(Question::key).collect();
        if keys.is_empty() {
            return;
        }

        let mut sessions = self.load().await;
        sessions.insert(0, keys);
        sessions.truncate(RECENT_EXAM_LIMIT);

        if let Err(err) = self.repo.save_recent(&sessions).await {
            tracing::warn!(error = %err, "failed to persist recent exams");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
