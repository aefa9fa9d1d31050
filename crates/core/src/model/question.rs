use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question category cannot be empty")]
    EmptyCategory,
}

/// Error type for parsing an option letter from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLetterError {
    raw: String,
}

impl fmt::Display for ParseLetterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid option letter: {:?}", self.raw)
    }
}

impl std::error::Error for ParseLetterError {}

//
// ─── OPTION LETTERS ────────────────────────────────────────────────────────────
//

/// One of the three fixed answer slots on a question.
///
/// Every question offers exactly these three options, so a chosen answer is
/// represented by the letter alone. Anything outside the set is rejected at
/// the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
}

impl OptionLetter {
    /// All letters, in display order.
    pub const ALL: [OptionLetter; 3] = [OptionLetter::A, OptionLetter::B, OptionLetter::C];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLetter {
    type Err = ParseLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(OptionLetter::A),
            "B" | "b" => Ok(OptionLetter::B),
            "C" | "c" => Ok(OptionLetter::C),
            other => Err(ParseLetterError {
                raw: other.to_owned(),
            }),
        }
    }
}

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

/// The three answer texts of a question, keyed by option letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    #[serde(rename = "A")]
    a: String,
    #[serde(rename = "B")]
    b: String,
    #[serde(rename = "C")]
    c: String,
}

impl ChoiceSet {
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
        }
    }

    /// The answer text shown under the given letter.
    #[must_use]
    pub fn text(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.a,
            OptionLetter::B => &self.b,
            OptionLetter::C => &self.c,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question record.
///
/// Created by the bank loader, immutable afterwards, and shared read-only by
/// selection, the session tracker, and grading. Both `id` and `hash` are
/// optional on the wire; `hash` is the preferred identity for history
/// tracking since ids may shift between bank revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    id: Option<QuestionId>,
    #[serde(default)]
    hash: Option<String>,
    category: String,
    #[serde(rename = "question")]
    text: String,
    answers: ChoiceSet,
    correct: OptionLetter,
}

impl Question {
    /// Creates a validated question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question text or category is empty.
    pub fn new(
        id: Option<QuestionId>,
        hash: Option<String>,
        category: impl Into<String>,
        text: impl Into<String>,
        answers: ChoiceSet,
        correct: OptionLetter,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            id,
            hash,
            category: category.into(),
            text: text.into(),
            answers,
            correct,
        };
        question.validate()?;
        Ok(question)
    }

    /// Re-checks record invariants, for records that bypassed `new`
    /// (e.g. deserialized bank entries).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question text or category is empty.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> Option<QuestionId> {
        self.id
    }

    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &ChoiceSet {
        &self.answers
    }

    #[must_use]
    pub fn correct(&self) -> OptionLetter {
        self.correct
    }

    /// Stable identity used for history tracking and in-draw uniqueness.
    ///
    /// Prefers the content hash, falling back to the decimal id. Returns
    /// `None` when neither is usable; such records are excluded from
    /// key-based bookkeeping but stay selectable and gradable.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        if let Some(hash) = self.hash.as_deref() {
            if !hash.is_empty() {
                return Some(hash.to_owned());
            }
        }
        self.id.map(|id| id.to_string())
    }

    /// Whether the given letter is this question's correct answer.
    #[must_use]
    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        letter == self.correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_question(id: Option<u64>, hash: Option<&str>) -> Question {
        Question::new(
            id.map(QuestionId::new),
            hash.map(str::to_owned),
            "safety",
            "Which way is up?",
            ChoiceSet::new("North", "South", "Sideways"),
            OptionLetter::A,
        )
        .unwrap()
    }

    #[test]
    fn key_prefers_hash_over_id() {
        let question = build_question(Some(7), Some("abc123"));
        assert_eq!(question.key().as_deref(), Some("abc123"));
    }

    #[test]
    fn key_falls_back_to_id_when_hash_is_empty() {
        let question = build_question(Some(7), Some(""));
        assert_eq!(question.key().as_deref(), Some("7"));
    }

    #[test]
    fn key_is_none_without_hash_or_id() {
        let question = build_question(None, None);
        assert_eq!(question.key(), None);
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = Question::new(
            Some(QuestionId::new(1)),
            None,
            "safety",
            "   ",
            ChoiceSet::new("x", "y", "z"),
            OptionLetter::B,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn letter_parse_accepts_lowercase() {
        assert_eq!("b".parse::<OptionLetter>().unwrap(), OptionLetter::B);
    }

    #[test]
    fn letter_parse_rejects_out_of_set_values() {
        assert!("D".parse::<OptionLetter>().is_err());
        assert!("AB".parse::<OptionLetter>().is_err());
        assert!("".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn choice_text_lookup_follows_letter() {
        let question = build_question(Some(1), None);
        assert_eq!(question.answers().text(OptionLetter::C), "Sideways");
    }

    #[test]
    fn is_correct_matches_correct_letter_only() {
        let question = build_question(Some(1), None);
        assert!(question.is_correct(OptionLetter::A));
        assert!(!question.is_correct(OptionLetter::B));
    }
}
