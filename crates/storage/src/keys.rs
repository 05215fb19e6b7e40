//! Key namespace for the on-device store.
//!
//! Keys are string-prefixed and namespaced by student id where noted, so
//! concurrent managers for different students never collide. The session
//! snapshot key is global: a device holds at most one active session.

use vocab_core::model::StudentId;

/// Current session snapshot (global, not per-student).
pub const SESSION_KEY: &str = "vocabulary_session";

/// Per-student progress record key.
#[must_use]
pub fn progress_key(student_id: &StudentId) -> String {
    format!("vocabulary_progress_{student_id}")
}

/// Per-student seen-words list key.
#[must_use]
pub fn seen_words_key(student_id: &StudentId) -> String {
    format!("vocabulary_seen_words_{student_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_student() {
        let a = StudentId::new("a");
        let b = StudentId::new("b");
        assert_ne!(progress_key(&a), progress_key(&b));
        assert_ne!(seen_words_key(&a), seen_words_key(&b));
        assert_eq!(progress_key(&a), "vocabulary_progress_a");
        assert_eq!(seen_words_key(&a), "vocabulary_seen_words_a");
    }
}
