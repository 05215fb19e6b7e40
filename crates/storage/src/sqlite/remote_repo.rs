use sqlx::Row;

use vocab_core::model::{ProgressRecord, SessionId, StudentId, VocabularyCard};

use super::SqliteRemoteStore;
use crate::repository::{RemoteStore, SessionRecord, StoreError};

fn conn<E: core::fmt::Display>(e: E) -> StoreError {
    StoreError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StoreError {
    StoreError::Serialization(e.to_string())
}

fn usize_from_i64(field: &'static str, v: i64) -> Result<usize, StoreError> {
    usize::try_from(v).map_err(|_| StoreError::Serialization(format!("invalid {field}: {v}")))
}

fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StoreError> {
    let session_id: String = row.try_get("session_id").map_err(ser)?;
    let student_id: String = row.try_get("student_id").map_err(ser)?;
    let words_json: String = row.try_get("words").map_err(ser)?;
    let words: Vec<VocabularyCard> = serde_json::from_str(&words_json).map_err(ser)?;
    let current_position = usize_from_i64(
        "current_position",
        row.try_get::<i64, _>("current_position").map_err(ser)?,
    )?;
    let start_time = row.try_get("start_time").map_err(ser)?;
    let is_active: i64 = row.try_get("is_active").map_err(ser)?;

    Ok(SessionRecord {
        session_id: SessionId::from_persisted(session_id),
        student_id: StudentId::new(student_id),
        words,
        current_position,
        start_time,
        is_active: is_active != 0,
    })
}

fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord, StoreError> {
    let student_id: String = row.try_get("student_id").map_err(ser)?;
    let last_session_id: String = row.try_get("last_session_id").map_err(ser)?;
    let last_position = usize_from_i64(
        "last_position",
        row.try_get::<i64, _>("last_position").map_err(ser)?,
    )?;
    let last_access_time = row.try_get("last_access_time").map_err(ser)?;
    let total_words_studied = usize_from_i64(
        "total_words_studied",
        row.try_get::<i64, _>("total_words_studied").map_err(ser)?,
    )?;
    let session_duration_secs: i64 = row.try_get("session_duration_secs").map_err(ser)?;

    Ok(ProgressRecord {
        student_id: StudentId::new(student_id),
        last_session_id: SessionId::from_persisted(last_session_id),
        last_position,
        last_access_time,
        total_words_studied,
        session_duration_secs,
    })
}

#[async_trait::async_trait]
impl RemoteStore for SqliteRemoteStore {
    async fn upsert_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let words_json = serde_json::to_string(&record.words).map_err(ser)?;
        let current_position = i64::try_from(record.current_position)
            .map_err(|_| StoreError::Serialization("current_position overflow".into()))?;

        sqlx::query(
            r"
                INSERT INTO vocabulary_sessions (
                    session_id, student_id, words, current_position,
                    start_time, is_active
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(session_id) DO UPDATE SET
                    student_id = excluded.student_id,
                    words = excluded.words,
                    current_position = excluded.current_position,
                    start_time = excluded.start_time,
                    is_active = excluded.is_active
            ",
        )
        .bind(record.session_id.as_str())
        .bind(record.student_id.as_str())
        .bind(words_json)
        .bind(current_position)
        .bind(record.start_time)
        .bind(i64::from(record.is_active))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<SessionRecord, StoreError> {
        let row = sqlx::query(
            r"
                SELECT session_id, student_id, words, current_position,
                       start_time, is_active
                FROM vocabulary_sessions
                WHERE session_id = ?1
            ",
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StoreError::NotFound)?;

        map_session_row(&row)
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let last_position = i64::try_from(record.last_position)
            .map_err(|_| StoreError::Serialization("last_position overflow".into()))?;
        let total_words_studied = i64::try_from(record.total_words_studied)
            .map_err(|_| StoreError::Serialization("total_words_studied overflow".into()))?;

        sqlx::query(
            r"
                INSERT INTO vocabulary_progress (
                    student_id, last_session_id, last_position,
                    last_access_time, total_words_studied, session_duration_secs
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(student_id) DO UPDATE SET
                    last_session_id = excluded.last_session_id,
                    last_position = excluded.last_position,
                    last_access_time = excluded.last_access_time,
                    total_words_studied = excluded.total_words_studied,
                    session_duration_secs = excluded.session_duration_secs
            ",
        )
        .bind(record.student_id.as_str())
        .bind(record.last_session_id.as_str())
        .bind(last_position)
        .bind(record.last_access_time)
        .bind(total_words_studied)
        .bind(record.session_duration_secs)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_progress(&self, student_id: &StudentId) -> Result<ProgressRecord, StoreError> {
        let row = sqlx::query(
            r"
                SELECT student_id, last_session_id, last_position,
                       last_access_time, total_words_studied, session_duration_secs
                FROM vocabulary_progress
                WHERE student_id = ?1
            ",
        )
        .bind(student_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StoreError::NotFound)?;

        map_progress_row(&row)
    }

    async fn upsert_seen_words(
        &self,
        student_id: &StudentId,
        words: &[String],
    ) -> Result<(), StoreError> {
        let words_json = serde_json::to_string(words).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO seen_words (student_id, words)
                VALUES (?1, ?2)
                ON CONFLICT(student_id) DO UPDATE SET
                    words = excluded.words
            ",
        )
        .bind(student_id.as_str())
        .bind(words_json)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_seen_words(&self, student_id: &StudentId) -> Result<Vec<String>, StoreError> {
        let row = sqlx::query("SELECT words FROM seen_words WHERE student_id = ?1")
            .bind(student_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => {
                let words_json: String = row.try_get("words").map_err(ser)?;
                serde_json::from_str(&words_json).map_err(ser)
            }
            None => Ok(Vec::new()),
        }
    }
}
