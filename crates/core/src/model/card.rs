use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// Example sentences for a word, one per grammatical tense.
///
/// All six tenses are mandatory; a card missing any of them is structurally
/// invalid and rejected at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenseExamples {
    pub present: String,
    pub past: String,
    pub future: String,
    #[serde(rename = "present-perfect")]
    pub present_perfect: String,
    #[serde(rename = "past-perfect")]
    pub past_perfect: String,
    #[serde(rename = "future-perfect")]
    pub future_perfect: String,
}

impl TenseExamples {
    /// All six example sentences in a fixed tense order.
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            &self.present,
            &self.past,
            &self.future,
            &self.present_perfect,
            &self.past_perfect,
            &self.future_perfect,
        ]
    }
}

/// A single vocabulary item in a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyCard {
    pub word: String,
    pub pronunciation: String,
    pub part_of_speech: String,
    pub definition: String,
    pub example_sentences: TenseExamples,
}

impl VocabularyCard {
    /// Checks the structural invariants beyond what the type system enforces.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyWord` if the headword is blank.
    pub fn validate(&self) -> Result<(), CardError> {
        if self.word.trim().is_empty() {
            return Err(CardError::EmptyWord);
        }
        Ok(())
    }
}

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card has an empty headword")]
    EmptyWord,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card(word: &str) -> VocabularyCard {
        VocabularyCard {
            word: word.to_string(),
            pronunciation: format!("/{word}/"),
            part_of_speech: "noun".to_string(),
            definition: format!("definition of {word}"),
            example_sentences: TenseExamples {
                present: format!("I study {word}."),
                past: format!("I studied {word}."),
                future: format!("I will study {word}."),
                present_perfect: format!("I have studied {word}."),
                past_perfect: format!("I had studied {word}."),
                future_perfect: format!("I will have studied {word}."),
            },
        }
    }

    #[test]
    fn card_with_headword_is_valid() {
        assert!(sample_card("ephemeral").validate().is_ok());
    }

    #[test]
    fn card_with_blank_headword_is_rejected() {
        let mut card = sample_card("ephemeral");
        card.word = "   ".to_string();
        assert_eq!(card.validate().unwrap_err(), CardError::EmptyWord);
    }

    #[test]
    fn missing_tense_key_fails_deserialization() {
        let json = serde_json::json!({
            "word": "run",
            "pronunciation": "/ran/",
            "part_of_speech": "verb",
            "definition": "to move quickly",
            "example_sentences": {
                "present": "I run.",
                "past": "I ran.",
                "future": "I will run.",
                "present-perfect": "I have run.",
                "past-perfect": "I had run."
                // future-perfect absent
            }
        });
        assert!(serde_json::from_value::<VocabularyCard>(json).is_err());
    }

    #[test]
    fn tense_keys_use_hyphenated_names_on_the_wire() {
        let card = sample_card("walk");
        let value = serde_json::to_value(&card).unwrap();
        let tenses = &value["example_sentences"];
        assert!(tenses.get("future-perfect").is_some());
        assert!(tenses.get("future_perfect").is_none());
    }
}
