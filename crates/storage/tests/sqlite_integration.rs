use chrono::Duration;
use vocab_core::model::{
    ProgressRecord, SessionId, StudentId, TenseExamples, VocabularyCard, VocabularySession,
};
use vocab_core::time::fixed_now;
use storage::repository::{RemoteStore, SessionRecord, StoreError};
use storage::sqlite::SqliteRemoteStore;

fn build_card(word: &str) -> VocabularyCard {
    VocabularyCard {
        word: word.to_string(),
        pronunciation: format!("/{word}/"),
        part_of_speech: "noun".to_string(),
        definition: format!("definition of {word}"),
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

fn build_session(student: &str, words: &[&str]) -> VocabularySession {
    let cards = words.iter().map(|w| build_card(w)).collect();
    VocabularySession::new(StudentId::new(student), cards, fixed_now()).unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_session_snapshot() {
    let repo = SqliteRemoteStore::connect("sqlite:file:memdb_session?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut session = build_session("s1", &["alpha", "beta", "gamma"]);
    session.advance();
    let record = SessionRecord::from_session(&session);
    repo.upsert_session(&record).await.unwrap();

    let fetched = repo.get_session(session.session_id()).await.expect("fetch");
    let restored = fetched.into_session().unwrap();
    assert_eq!(restored, session);
    assert_eq!(restored.current_position(), 1);
}

#[tokio::test]
async fn sqlite_upsert_overwrites_prior_snapshot() {
    let repo = SqliteRemoteStore::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut session = build_session("s1", &["alpha", "beta"]);
    repo.upsert_session(&SessionRecord::from_session(&session))
        .await
        .unwrap();

    session.advance();
    session.end();
    repo.upsert_session(&SessionRecord::from_session(&session))
        .await
        .unwrap();

    let fetched = repo.get_session(session.session_id()).await.unwrap();
    assert_eq!(fetched.current_position, 1);
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn sqlite_round_trips_progress_record() {
    let repo = SqliteRemoteStore::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let student = StudentId::new("s1");
    let record = ProgressRecord {
        student_id: student.clone(),
        last_session_id: SessionId::from_persisted("sess-1"),
        last_position: 4,
        last_access_time: fixed_now() - Duration::minutes(5),
        total_words_studied: 40,
        session_duration_secs: 900,
    };
    repo.upsert_progress(&record).await.unwrap();

    let fetched = repo.get_progress(&student).await.expect("fetch");
    assert_eq!(fetched, record);

    let missing = repo.get_progress(&StudentId::new("absent")).await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn sqlite_seen_words_overwrite_per_student() {
    let repo = SqliteRemoteStore::connect("sqlite:file:memdb_seen?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let student = StudentId::new("s1");
    assert!(repo.get_seen_words(&student).await.unwrap().is_empty());

    repo.upsert_seen_words(&student, &["alpha".to_string()])
        .await
        .unwrap();
    repo.upsert_seen_words(&student, &["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();

    let words = repo.get_seen_words(&student).await.unwrap();
    assert_eq!(words, vec!["alpha".to_string(), "beta".to_string()]);
}
