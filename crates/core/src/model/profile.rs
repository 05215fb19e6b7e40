use serde::{Deserialize, Serialize};

use crate::model::StudentId;

/// Personalization input for the word-generation endpoint.
///
/// Free-form by design; the generator decides how much of it to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub proficiency_level: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub native_language: Option<String>,
}

impl StudentProfile {
    #[must_use]
    pub fn new(student_id: StudentId, proficiency_level: impl Into<String>) -> Self {
        Self {
            student_id,
            proficiency_level: proficiency_level.into(),
            interests: Vec::new(),
            native_language: None,
        }
    }

    #[must_use]
    pub fn with_interests(mut self, interests: Vec<String>) -> Self {
        self.interests = interests;
        self
    }
}
