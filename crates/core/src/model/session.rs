use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{SessionId, StudentId, VocabularyCard};
use crate::model::progress::SessionProgress;

/// How long a persisted session stays worth resuming.
#[must_use]
pub fn default_staleness_window() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no words available for session")]
    Empty,
}

/// An in-progress ordered traversal of vocabulary cards by one student.
///
/// The word list is fixed at creation; insertion order is the study order.
/// The cursor is the only mutable part and is clamped to valid bounds on
/// every mutation.
#[derive(Clone, PartialEq, Eq)]
pub struct VocabularySession {
    session_id: SessionId,
    student_id: StudentId,
    words: Vec<VocabularyCard>,
    current_position: usize,
    start_time: DateTime<Utc>,
    is_active: bool,
}

impl VocabularySession {
    /// Create a new active session starting at the first word.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no words are provided.
    pub fn new(
        student_id: StudentId,
        words: Vec<VocabularyCard>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if words.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            session_id: SessionId::generate(),
            student_id,
            words,
            current_position: 0,
            start_time: started_at,
            is_active: true,
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// An out-of-range cursor is clamped to the last word rather than
    /// rejected, so a snapshot written by a buggy or newer writer still
    /// rehydrates.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the persisted word list is empty.
    pub fn from_persisted(
        session_id: SessionId,
        student_id: StudentId,
        words: Vec<VocabularyCard>,
        current_position: usize,
        start_time: DateTime<Utc>,
        is_active: bool,
    ) -> Result<Self, SessionError> {
        if words.is_empty() {
            return Err(SessionError::Empty);
        }
        let current_position = current_position.min(words.len() - 1);
        Ok(Self {
            session_id,
            student_id,
            words,
            current_position,
            start_time,
            is_active,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn words(&self) -> &[VocabularyCard] {
        &self.words
    }

    #[must_use]
    pub fn current_position(&self) -> usize {
        self.current_position
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Total number of words in this session.
    #[must_use]
    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    /// The word under the cursor. Always present: the word list is non-empty
    /// by construction and the cursor stays in bounds.
    #[must_use]
    pub fn current_word(&self) -> &VocabularyCard {
        &self.words[self.current_position]
    }

    /// Move the cursor forward by one.
    ///
    /// Returns the newly-current card, or `None` when already at the last
    /// word; the cursor is left unchanged at the boundary.
    pub fn advance(&mut self) -> Option<&VocabularyCard> {
        if self.current_position + 1 < self.words.len() {
            self.current_position += 1;
            Some(&self.words[self.current_position])
        } else {
            None
        }
    }

    /// Move the cursor back by one.
    ///
    /// Returns the newly-current card, or `None` when already at the first
    /// word; the cursor is left unchanged at the boundary.
    pub fn retreat(&mut self) -> Option<&VocabularyCard> {
        if self.current_position > 0 {
            self.current_position -= 1;
            Some(&self.words[self.current_position])
        } else {
            None
        }
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::at(self.current_position, self.words.len())
    }

    /// Mark the session as ended. Ended sessions are never reactivated;
    /// continuing afterwards always creates a new session.
    pub fn end(&mut self) {
        self.is_active = false;
    }

    /// Time spent in the session as of `now`.
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        (now - self.start_time).max(Duration::zero())
    }

    /// True once the session's age exceeds the staleness window, after which
    /// recovery treats it as "nothing to resume".
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.duration(now) > window
    }
}

impl fmt::Debug for VocabularySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularySession")
            .field("session_id", &self.session_id)
            .field("student_id", &self.student_id)
            .field("words_len", &self.words.len())
            .field("current_position", &self.current_position)
            .field("start_time", &self.start_time)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
