use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{SessionId, StudentId};

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based index of the word under the cursor.
    pub current: usize,
    pub total: usize,
    /// `round(100 * current / total)`.
    pub percentage: u8,
}

impl SessionProgress {
    /// Progress for a 0-based cursor over `total` words.
    #[must_use]
    pub fn at(position: usize, total: usize) -> Self {
        if total == 0 {
            return Self::none();
        }
        let current = position + 1;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percentage = ((current as f64 / total as f64) * 100.0).round() as u8;
        Self {
            current,
            total,
            percentage,
        }
    }

    /// The empty progress reading reported when no session is active.
    #[must_use]
    pub fn none() -> Self {
        Self {
            current: 0,
            total: 0,
            percentage: 0,
        }
    }
}

/// Lightweight pointer record used to decide whether a session can be resumed
/// without loading its full word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub student_id: StudentId,
    pub last_session_id: SessionId,
    pub last_position: usize,
    pub last_access_time: DateTime<Utc>,
    pub total_words_studied: usize,
    /// Seconds spent in the last session.
    pub session_duration_secs: i64,
}

impl ProgressRecord {
    /// True while `last_access_time` is within the staleness window.
    #[must_use]
    pub fn is_resumable(&self, now: DateTime<Utc>, window: Duration) -> bool {
        (now - self.last_access_time).max(Duration::zero()) <= window
    }
}
