use chrono::Utc;
use sqlx::Row;

use super::SqliteStore;
use crate::repository::{HistoryRepository, StorageError};

/// Fixed key under which the recent-exam history is stored.
const RECENT_EXAMS_KEY: &str = "recent_exams_v1";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Decodes a persisted history payload, dropping anything malformed.
///
/// A payload that is not a JSON list yields no history; entries that are not
/// lists are dropped; non-string elements within an entry are dropped. The
/// payload may have been written by an older version or edited externally,
/// so decode failures degrade instead of erroring.
fn decode_sessions(raw: &str) -> Vec<Vec<String>> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| entry.as_array())
        .map(|keys| {
            keys.iter()
                .filter_map(|key| key.as_str().map(str::to_owned))
                .collect()
        })
        .collect()
}

#[async_trait::async_trait]
impl HistoryRepository for SqliteStore {
    async fn load_recent(&self) -> Result<Vec<Vec<String>>, StorageError> {
        let row = sqlx::query("SELECT payload FROM kv_store WHERE key = ?1")
            .bind(RECENT_EXAMS_KEY)
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let payload: String = row.try_get("payload").map_err(conn)?;
        Ok(decode_sessions(&payload))
    }

    async fn save_recent(&self, sessions: &[Vec<String>]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(sessions)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO kv_store (key, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(RECENT_EXAMS_KEY)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_tolerates_non_json_payload() {
        assert!(decode_sessions("not json at all").is_empty());
    }

    #[test]
    fn decode_tolerates_non_list_payload() {
        assert!(decode_sessions(r#"{"recent": []}"#).is_empty());
        assert!(decode_sessions("42").is_empty());
    }

    #[test]
    fn decode_drops_malformed_entries_individually() {
        let raw = r#"[["a", "b"], "oops", 7, ["c", 3, "d"]]"#;
        let sessions = decode_sessions(raw);
        assert_eq!(
            sessions,
            vec![
                vec!["a".to_owned(), "b".to_owned()],
                vec!["c".to_owned(), "d".to_owned()],
            ]
        );
    }

    #[test]
    fn decode_keeps_empty_list() {
        assert!(decode_sessions("[]").is_empty());
    }
}
