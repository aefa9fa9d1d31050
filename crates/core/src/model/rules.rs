use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("priority category set cannot be empty")]
    EmptyPriorityCategories,

    #[error("priority quota must be > 0")]
    InvalidPriorityQuota,

    #[error("general quota must be > 0")]
    InvalidGeneralQuota,

    #[error("allowed general errors must be < general quota")]
    InvalidAllowedErrors,

    #[error("time limit must be > 0 seconds")]
    InvalidTimeLimit,
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Composition and grading policy for one exam.
///
/// Every exam draws `priority_quota` questions from the priority categories
/// followed by `general_quota` questions from the rest of the bank. Passing
/// requires a flawless priority section and at most `allowed_general_errors`
/// mistakes elsewhere; the two conditions are separate gates, not a shared
/// error budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRules {
    priority_categories: Vec<String>,
    priority_quota: usize,
    general_quota: usize,
    allowed_general_errors: usize,
    time_limit_secs: u32,
}

impl ExamRules {
    /// Creates the statutory licensing-exam defaults.
    ///
    /// - 4 questions from the regulations/safety categories, zero errors allowed
    /// - 6 questions from the remaining categories, one error allowed
    /// - 20-minute time limit in exam mode
    #[must_use]
    pub fn default_for_licensing() -> Self {
        Self {
            priority_categories: vec!["regulations".to_owned(), "safety".to_owned()],
            priority_quota: 4,
            general_quota: 6,
            allowed_general_errors: 1,
            time_limit_secs: 20 * 60,
        }
    }

    /// Creates custom exam rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if the category set is empty, a quota is zero,
    /// the error allowance is not below the general quota, or the time limit
    /// is zero.
    pub fn new(
        priority_categories: Vec<String>,
        priority_quota: usize,
        general_quota: usize,
        allowed_general_errors: usize,
        time_limit_secs: u32,
    ) -> Result<Self, RulesError> {
        if priority_categories.is_empty() {
            return Err(RulesError::EmptyPriorityCategories);
        }
        if priority_quota == 0 {
            return Err(RulesError::InvalidPriorityQuota);
        }
        if general_quota == 0 {
            return Err(RulesError::InvalidGeneralQuota);
        }
        if allowed_general_errors >= general_quota {
            return Err(RulesError::InvalidAllowedErrors);
        }
        if time_limit_secs == 0 {
            return Err(RulesError::InvalidTimeLimit);
        }

        Ok(Self {
            priority_categories,
            priority_quota,
            general_quota,
            allowed_general_errors,
            time_limit_secs,
        })
    }

    #[must_use]
    pub fn priority_categories(&self) -> &[String] {
        &self.priority_categories
    }

    #[must_use]
    pub fn priority_quota(&self) -> usize {
        self.priority_quota
    }

    #[must_use]
    pub fn general_quota(&self) -> usize {
        self.general_quota
    }

    #[must_use]
    pub fn allowed_general_errors(&self) -> usize {
        self.allowed_general_errors
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    /// Total number of questions in a composed exam.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.priority_quota + self.general_quota
    }

    /// Whether the category belongs to the priority set.
    #[must_use]
    pub fn is_priority(&self, category: &str) -> bool {
        self.priority_categories.iter().any(|c| c == category)
    }
}

impl Default for ExamRules {
    fn default() -> Self {
        Self::default_for_licensing()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
