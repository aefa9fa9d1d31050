use std::path::Path;

use exam_core::model::{Question, QuestionError};
use thiserror::Error;

/// Errors raised while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read bank file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse bank JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid question record at index {index}: {source}")]
    InvalidRecord { index: usize, source: QuestionError },

    #[error("question bank is empty")]
    Empty,
}

/// Parses a question bank from its JSON text.
///
/// The bank is a JSON array of question records. Every record must carry a
/// non-empty question text and category; `id` and `hash` stay optional (a
/// record without either is simply excluded from history tracking).
///
/// # Errors
///
/// Returns `BankError` when the JSON cannot be parsed, a record fails
/// validation, or the bank holds no questions at all.
pub fn parse_bank(json: &str) -> Result<Vec<Question>, BankError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    if questions.is_empty() {
        return Err(BankError::Empty);
    }
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| BankError::InvalidRecord { index, source })?;
    }
    Ok(questions)
}

/// Reads and parses a question bank file.
///
/// # Errors
///
/// Returns `BankError` if the file cannot be read or fails to parse.
pub fn load_bank(path: &Path) -> Result<Vec<Question>, BankError> {
    let json = std::fs::read_to_string(path)?;
    parse_bank(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::OptionLetter;

    const SAMPLE: &str = r#"
        [
            {
                "id": 1,
                "hash": "h-one",
                "category": "safety",
                "question": "When is it safe to proceed?",
                "answers": {"A": "Always", "B": "After checking", "C": "Never"},
                "correct": "B"
            },
            {
                "category": "history",
                "question": "Which came first?",
                "answers": {"A": "The egg", "B": "The chicken", "C": "Neither"},
                "correct": "A"
            }
        ]
    "#;

    #[test]
    fn parses_records_with_optional_identity() {
        let bank = parse_bank(SAMPLE).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank[0].key().as_deref(), Some("h-one"));
        assert_eq!(bank[0].correct(), OptionLetter::B);
        assert_eq!(bank[1].key(), None);
    }

    #[test]
    fn rejects_out_of_set_correct_letter() {
        let raw = r#"
            [{
                "category": "safety",
                "question": "Q",
                "answers": {"A": "x", "B": "y", "C": "z"},
                "correct": "D"
            }]
        "#;
        assert!(matches!(parse_bank(raw), Err(BankError::Json(_))));
    }

    #[test]
    fn rejects_empty_bank() {
        assert!(matches!(parse_bank("[]"), Err(BankError::Empty)));
    }

    #[test]
    fn rejects_record_with_empty_text() {
        let raw = r#"
            [{
                "category": "safety",
                "question": "  ",
                "answers": {"A": "x", "B": "y", "C": "z"},
                "correct": "A"
            }]
        "#;
        assert!(matches!(
            parse_bank(raw),
            Err(BankError::InvalidRecord { index: 0, .. })
        ));
    }
}
