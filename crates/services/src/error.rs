//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use exam_core::model::OutcomeError;

/// The two sections of a composed exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamSection {
    Priority,
    General,
}

impl fmt::Display for ExamSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamSection::Priority => f.write_str("priority"),
            ExamSection::General => f.write_str("general"),
        }
    }
}

/// Errors emitted by exam services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    /// The pool cannot fill a section quota even with avoidance disabled.
    /// No partial exam is produced in this case.
    #[error("not enough distinct {section} questions: needed {needed}, found {found}")]
    InsufficientQuestions {
        section: ExamSection,
        needed: usize,
        found: usize,
    },

    #[error("exam already completed")]
    Completed,

    #[error("exam is not complete yet")]
    NotComplete,

    #[error("current question has not been answered")]
    NotAnswered,

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}
