//! Static offline vocabulary, used when the caller explicitly opts into a
//! fallback after a generation failure. Never substituted silently.

use vocab_core::model::{TenseExamples, VocabularyCard};

fn card(
    word: &str,
    pronunciation: &str,
    part_of_speech: &str,
    definition: &str,
    tenses: [&str; 6],
) -> VocabularyCard {
    VocabularyCard {
        word: word.to_string(),
        pronunciation: pronunciation.to_string(),
        part_of_speech: part_of_speech.to_string(),
        definition: definition.to_string(),
        example_sentences: TenseExamples {
            present: tenses[0].to_string(),
            past: tenses[1].to_string(),
            future: tenses[2].to_string(),
            present_perfect: tenses[3].to_string(),
            past_perfect: tenses[4].to_string(),
            future_perfect: tenses[5].to_string(),
        },
    }
}

/// The offline word list. Fixed content, structurally valid cards.
#[must_use]
pub fn fallback_words() -> Vec<VocabularyCard> {
    vec![
        card(
            "improve",
            "/ɪmˈpruːv/",
            "verb",
            "to become or make something better",
            [
                "I improve my vocabulary every day.",
                "She improved her pronunciation last month.",
                "They will improve their writing soon.",
                "He has improved a lot this term.",
                "We had improved before the exam started.",
                "You will have improved by the end of the course.",
            ],
        ),
        card(
            "describe",
            "/dɪˈskraɪb/",
            "verb",
            "to say what something or someone is like",
            [
                "I describe the picture to my tutor.",
                "He described his hometown yesterday.",
                "She will describe the plot tomorrow.",
                "They have described the problem clearly.",
                "We had described the route before leaving.",
                "You will have described every scene by Friday.",
            ],
        ),
        card(
            "habit",
            "/ˈhæbɪt/",
            "noun",
            "something you do often and regularly",
            [
                "Reading is a habit I enjoy.",
                "Running became a habit last year.",
                "Saving money will become a habit.",
                "Studying daily has become a habit.",
                "Waking early had been a habit for years.",
                "Practicing will have become a habit by summer.",
            ],
        ),
        card(
            "curious",
            "/ˈkjʊəriəs/",
            "adjective",
            "eager to know or learn something",
            [
                "I am curious about new words.",
                "She was curious about the ending.",
                "He will be curious about your trip.",
                "They have been curious since the announcement.",
                "We had been curious long before the reveal.",
                "You will have been curious for weeks by then.",
            ],
        ),
        card(
            "arrange",
            "/əˈreɪndʒ/",
            "verb",
            "to plan or organize something in advance",
            [
                "I arrange my notes before class.",
                "She arranged a meeting last week.",
                "They will arrange the schedule tonight.",
                "He has arranged everything already.",
                "We had arranged the room before guests arrived.",
                "You will have arranged the details by Monday.",
            ],
        ),
        card(
            "gradually",
            "/ˈɡrædʒuəli/",
            "adverb",
            "slowly, over a period of time",
            [
                "My accent gradually changes.",
                "The weather gradually cooled.",
                "Your fluency will gradually grow.",
                "Prices have gradually risen.",
                "The noise had gradually faded.",
                "The habit will have gradually formed.",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_words_are_structurally_valid() {
        let words = fallback_words();
        assert!(!words.is_empty());
        for word in &words {
            word.validate().unwrap();
            for sentence in word.example_sentences.all() {
                assert!(!sentence.is_empty());
            }
        }
    }

    #[test]
    fn fallback_words_are_distinct() {
        let words = fallback_words();
        let mut headwords: Vec<_> = words.iter().map(|w| w.word.as_str()).collect();
        headwords.sort_unstable();
        headwords.dedup();
        assert_eq!(headwords.len(), words.len());
    }
}
