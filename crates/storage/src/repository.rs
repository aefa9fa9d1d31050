use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for the recent-exam history.
///
/// History is best-effort: callers treat a failed load as an empty history
/// and a failed save as a no-op. Implementations are expected to degrade in
/// the same spirit; a corrupt stored payload yields whatever entries are
/// still readable, not a decode error.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Stored exams, most recent first. Each entry is the list of question
    /// keys one exam used.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the store itself is unreachable.
    async fn load_recent(&self) -> Result<Vec<Vec<String>>, StorageError>;

    /// Replaces the stored exams.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the payload cannot be written.
    async fn save_recent(&self, sessions: &[Vec<String>]) -> Result<(), StorageError>;
}

/// Simple in-memory history implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryHistory {
    sessions: Arc<Mutex<Vec<Vec<String>>>>,
}

impl InMemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistory {
    async fn load_recent(&self) -> Result<Vec<Vec<String>>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_recent(&self, sessions: &[Vec<String>]) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = sessions.to_vec();
        Ok(())
    }
}

/// History sink for environments without any persistent storage.
///
/// Loads nothing and discards writes, which the engine treats as running
/// with no history.
#[derive(Clone, Copy, Default)]
pub struct NullHistory;

#[async_trait]
impl HistoryRepository for NullHistory {
    async fn load_recent(&self) -> Result<Vec<Vec<String>>, StorageError> {
        Ok(Vec::new())
    }

    async fn save_recent(&self, _sessions: &[Vec<String>]) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trips_sessions() {
        let repo = InMemoryHistory::new();
        let sessions = vec![vec!["a".to_owned(), "b".to_owned()], vec!["c".to_owned()]];

        repo.save_recent(&sessions).await.unwrap();
        let loaded = repo.load_recent().await.unwrap();

        assert_eq!(loaded, sessions);
    }

    #[tokio::test]
    async fn null_history_loads_empty_and_ignores_saves() {
        let repo = NullHistory;
        repo.save_recent(&[vec!["a".to_owned()]]).await.unwrap();
        assert!(repo.load_recent().await.unwrap().is_empty());
    }
}
