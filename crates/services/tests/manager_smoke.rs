use std::sync::Arc;

use services::{Clock, SessionManager};
use storage::repository::Stores;
use storage::JsonFileStore;
use vocab_core::model::{StudentId, TenseExamples, VocabularyCard};
use vocab_core::time::fixed_now;

fn build_card(word: &str) -> VocabularyCard {
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

#[tokio::test]
async fn study_flow_and_recovery_across_managers() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let stores = Stores::sqlite(
        "sqlite:file:memdb_manager_smoke?mode=memory&cache=shared",
        local,
    )
    .await
    .expect("sqlite stores");

    let student = StudentId::new("s1");
    let mut manager =
        SessionManager::new(stores.clone()).with_clock(Clock::fixed(fixed_now()));

    let progress = manager
        .create_session(student.clone(), vec![build_card("alpha"), build_card("beta")])
        .await
        .unwrap();
    assert_eq!((progress.current, progress.total, progress.percentage), (1, 2, 50));

    let next = manager.navigate_next().await.expect("second word");
    assert_eq!(next.word, "beta");
    let progress = manager.session_progress().await;
    assert_eq!((progress.current, progress.total, progress.percentage), (2, 2, 100));
    assert!(manager.navigate_next().await.is_none());

    manager.add_seen_word("alpha", &student).await;
    manager.add_seen_word("alpha", &student).await;
    assert_eq!(manager.seen_words(&student).await.len(), 1);

    manager.cleanup().await;
    drop(manager);

    // a new manager on the same device resumes where the first left off
    let mut resumed =
        SessionManager::new(stores.clone()).with_clock(Clock::fixed(fixed_now()));
    assert!(resumed.can_continue_from_last_memory(&student).await);
    let progress = resumed.recover_session(&student).await.expect("resume");
    assert_eq!((progress.current, progress.total), (2, 2));
    assert_eq!(resumed.current_word().await.unwrap().word, "beta");

    resumed.end_session().await;
    assert!(resumed.recover_session(&student).await.is_none());

    // device cleanup wipes local keys; the remote mirror still seeds the set
    resumed.clear_session_data(&student).await;
    assert_eq!(resumed.seen_words(&student).await, vec!["alpha".to_string()]);
}
