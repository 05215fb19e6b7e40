use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use vocab_core::model::{
    ProgressRecord, SessionError, SessionId, StudentId, VocabularyCard, VocabularySession,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a session snapshot.
///
/// This mirrors the domain `VocabularySession` so adapters can
/// serialize/deserialize without leaking storage concerns into the domain
/// layer. The same shape is written to the on-device store (as JSON) and to
/// the remote sessions table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub words: Vec<VocabularyCard>,
    pub current_position: usize,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &VocabularySession) -> Self {
        Self {
            session_id: session.session_id().clone(),
            student_id: session.student_id().clone(),
            words: session.words().to_vec(),
            current_position: session.current_position(),
            start_time: session.start_time(),
            is_active: session.is_active(),
        }
    }

    /// Convert the record back into a domain `VocabularySession`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the persisted word list fails validation.
    pub fn into_session(self) -> Result<VocabularySession, SessionError> {
        VocabularySession::from_persisted(
            self.session_id,
            self.student_id,
            self.words,
            self.current_position,
            self.start_time,
            self.is_active,
        )
    }
}

/// Key/value contract for the on-device store.
///
/// Values are opaque strings; the services layer decides the encoding and
/// performs all structural validation. Absent keys read as `None` rather
/// than an error.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Fetch the value under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Table-scoped contract for the hosted database.
///
/// Covers the three persisted shapes: session snapshots, progress records
/// and per-student seen-words lists. Adapters perform no business
/// validation, keeping backends substitutable.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Persist or overwrite a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the snapshot cannot be stored.
    async fn upsert_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Fetch a session snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if missing, or other storage errors.
    async fn get_session(&self, session_id: &SessionId) -> Result<SessionRecord, StoreError>;

    /// Persist or overwrite a student's progress record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StoreError>;

    /// Fetch a student's progress record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if missing, or other storage errors.
    async fn get_progress(&self, student_id: &StudentId) -> Result<ProgressRecord, StoreError>;

    /// Persist or overwrite a student's seen-words list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the list cannot be stored.
    async fn upsert_seen_words(
        &self,
        student_id: &StudentId,
        words: &[String],
    ) -> Result<(), StoreError>;

    /// Fetch a student's seen-words list. A student with no list yet reads
    /// as empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    async fn get_seen_words(&self, student_id: &StudentId) -> Result<Vec<String>, StoreError>;
}

/// Simple in-memory local store for testing and prototyping.
#[derive(Clone, Default)]
pub struct MemoryLocalStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// In-memory remote store for testing and prototyping.
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    sessions: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
    progress: Arc<Mutex<HashMap<StudentId, ProgressRecord>>>,
    seen_words: Arc<Mutex<HashMap<StudentId, Vec<String>>>>,
}

impl MemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn upsert_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<SessionRecord, StoreError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.get(session_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(record.student_id.clone(), record.clone());
        Ok(())
    }

    async fn get_progress(&self, student_id: &StudentId) -> Result<ProgressRecord, StoreError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.get(student_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn upsert_seen_words(
        &self,
        student_id: &StudentId,
        words: &[String],
    ) -> Result<(), StoreError> {
        let mut guard = self
            .seen_words
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(student_id.clone(), words.to_vec());
        Ok(())
    }

    async fn get_seen_words(&self, student_id: &StudentId) -> Result<Vec<String>, StoreError> {
        let guard = self
            .seen_words
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.get(student_id).cloned().unwrap_or_default())
    }
}

/// Aggregates the two adapters behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Stores {
    pub local: Arc<dyn LocalStore>,
    pub remote: Arc<dyn RemoteStore>,
}

impl Stores {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(MemoryLocalStore::new()),
            remote: Arc::new(MemoryRemoteStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::TenseExamples;
    use vocab_core::time::fixed_now;

    fn build_card(word: &str) -> VocabularyCard {
        VocabularyCard {
            word: word.to_string(),
            pronunciation: format!("/{word}/"),
            part_of_speech: "noun".to_string(),
            definition: String::new(),
            example_sentences: TenseExamples {
                present: "a".into(),
                past: "b".into(),
                future: "c".into(),
                present_perfect: "d".into(),
                past_perfect: "e".into(),
                future_perfect: "f".into(),
            },
        }
    }

    fn build_session() -> VocabularySession {
        VocabularySession::new(
            StudentId::new("s1"),
            vec![build_card("alpha"), build_card("beta")],
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn local_store_round_trips_values() {
        let store = MemoryLocalStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        // removing again is a no-op
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn remote_store_round_trips_session_record() {
        let store = MemoryRemoteStore::new();
        let session = build_session();
        let record = SessionRecord::from_session(&session);

        store.upsert_session(&record).await.unwrap();
        let fetched = store.get_session(session.session_id()).await.unwrap();
        let restored = fetched.into_session().unwrap();
        assert_eq!(restored, session);
    }

    #[tokio::test]
    async fn missing_session_reads_as_not_found() {
        let store = MemoryRemoteStore::new();
        let err = store
            .get_session(&SessionId::from_persisted("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn seen_words_default_to_empty() {
        let store = MemoryRemoteStore::new();
        let student = StudentId::new("s1");
        assert!(store.get_seen_words(&student).await.unwrap().is_empty());

        store
            .upsert_seen_words(&student, &["alpha".to_string()])
            .await
            .unwrap();
        assert_eq!(store.get_seen_words(&student).await.unwrap().len(), 1);
    }

    #[test]
    fn record_clamps_out_of_range_cursor() {
        let session = build_session();
        let mut record = SessionRecord::from_session(&session);
        record.current_position = 10;
        let restored = record.into_session().unwrap();
        assert_eq!(restored.current_position(), 1);
    }

    #[test]
    fn record_with_no_words_fails_rehydration() {
        let session = build_session();
        let mut record = SessionRecord::from_session(&session);
        record.words.clear();
        assert!(record.into_session().is_err());
    }
}
