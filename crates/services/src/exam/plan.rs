use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use exam_core::model::{ExamRules, Question};

use crate::error::{ExamError, ExamSection};

/// Selection result for a composed exam.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamPlan {
    pub questions: Vec<Question>,
    pub priority_selected: usize,
    pub general_selected: usize,
}

impl ExamPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

/// Composes a quota-balanced exam from a question pool.
///
/// The priority section is drawn exclusively from the rules' priority
/// categories and always occupies the front of the plan; the general section
/// fills the rest. Recently seen questions are avoided when enough unseen
/// material exists; avoidance is a soft preference, never a hard blocker.
pub struct ExamPlanner<'a> {
    rules: &'a ExamRules,
}

impl<'a> ExamPlanner<'a> {
    #[must_use]
    pub fn new(rules: &'a ExamRules) -> Self {
        Self { rules }
    }

    /// Compose an exam from `pool`, preferring questions outside `avoid_keys`.
    ///
    /// Each section runs two passes: a shuffled draw that skips avoided
    /// keys, then, if the quota is unmet, a fresh shuffled draw that ignores
    /// avoidance but still keeps in-call uniqueness. The pool itself is
    /// never mutated, and the priority-then-general order of the result is
    /// final (each section is shuffled internally, the concatenation is
    /// not reshuffled).
    ///
    /// # Errors
    ///
    /// Returns `ExamError::InsufficientQuestions` when a section cannot be
    /// filled even with avoidance disabled.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        pool: &[Question],
        avoid_keys: &HashSet<String>,
        rng: &mut R,
    ) -> Result<ExamPlan, ExamError> {
        let (priority, general): (Vec<&Question>, Vec<&Question>) = pool
            .iter()
            .partition(|q| self.rules.is_priority(q.category()));

        let mut used_keys = HashSet::new();

        let priority_picks = draw_section(
            &priority,
            self.rules.priority_quota(),
            &mut used_keys,
            avoid_keys,
            rng,
        );
        if priority_picks.len() < self.rules.priority_quota() {
            return Err(ExamError::InsufficientQuestions {
                section: ExamSection::Priority,
                needed: self.rules.priority_quota(),
                found: priority_picks.len(),
            });
        }

        let general_picks = draw_section(
            &general,
            self.rules.general_quota(),
            &mut used_keys,
            avoid_keys,
            rng,
        );
        if general_picks.len() < self.rules.general_quota() {
            return Err(ExamError::InsufficientQuestions {
                section: ExamSection::General,
                needed: self.rules.general_quota(),
                found: general_picks.len(),
            });
        }

        let priority_selected = priority_picks.len();
        let general_selected = general_picks.len();
        let mut questions = Vec::with_capacity(priority_selected + general_selected);
        questions.extend(priority_picks.into_iter().cloned());
        questions.extend(general_picks.into_iter().cloned());

        Ok(ExamPlan {
            questions,
            priority_selected,
            general_selected,
        })
    }
}

/// Fill one section: a first pass that honors the avoidance set, then a
/// fallback pass over a fresh shuffle that ignores it.
fn draw_section<'q, R: Rng + ?Sized>(
    candidates: &[&'q Question],
    quota: usize,
    used_keys: &mut HashSet<String>,
    avoid_keys: &HashSet<String>,
    rng: &mut R,
) -> Vec<&'q Question> {
    let mut picked = HashSet::new();
    let mut picks = pick_unique(
        candidates,
        quota,
        &mut picked,
        used_keys,
        Some(avoid_keys),
        rng,
    );
    if picks.len() < quota {
        let remainder = quota - picks.len();
        picks.extend(pick_unique(
            candidates, remainder, &mut picked, used_keys, None, rng,
        ));
    }
    picks
}

/// Draw up to `count` questions from a shuffled copy of `candidates`.
///
/// `picked` tracks candidate indices already taken this call, so a record is
/// never drawn twice even when it has no derivable key; `used_keys` carries
/// key-level uniqueness across both sections of the exam.
fn pick_unique<'q, R: Rng + ?Sized>(
    candidates: &[&'q Question],
    count: usize,
    picked: &mut HashSet<usize>,
    used_keys: &mut HashSet<String>,
    avoid_keys: Option<&HashSet<String>>,
    rng: &mut R,
) -> Vec<&'q Question> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.shuffle(rng);

    let mut picks = Vec::new();
    for idx in order {
        if picks.len() >= count {
            break;
        }
        if picked.contains(&idx) {
            continue;
        }
        let question = candidates[idx];
        let key = question.key();
        if let Some(key) = &key {
            if used_keys.contains(key) {
                continue;
            }
            if avoid_keys.is_some_and(|avoid| avoid.contains(key)) {
                continue;
            }
        }
        picked.insert(idx);
        if let Some(key) = key {
            used_keys.insert(key);
        }
        picks.push(question);
    }
    picks
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
