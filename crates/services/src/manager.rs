use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use storage::keys;
use storage::repository::{LocalStore, RemoteStore, SessionRecord, Stores};
use vocab_core::Clock;
use vocab_core::model::{
    ProgressRecord, SessionProgress, StudentId, StudentProfile, VocabularyCard, VocabularySession,
    default_staleness_window,
};

use crate::error::CreateSessionError;
use crate::generate::{RetryPolicy, WordGenerator, generate_with_retry};

/// Tuning knobs for a `SessionManager` instance.
#[derive(Debug, Clone, Copy)]
pub struct SessionManagerConfig {
    /// Period of the background snapshot save while a session is active.
    pub save_interval: StdDuration,
    /// Age beyond which a persisted session is no longer worth resuming.
    pub staleness_window: Duration,
    /// Backoff policy for the word-generation call.
    pub retry: RetryPolicy,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            save_interval: StdDuration::from_secs(30),
            staleness_window: default_staleness_window(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Single point of mutation for the active vocabulary session.
///
/// Owns the in-memory state, the periodic-save task, and the mediation
/// between the on-device and remote stores. Persistence on the navigation
/// and autosave paths is best-effort: failures are logged and the next tick
/// or move retries, so navigation itself never fails because a write did.
///
/// Two managers for the same student on different devices are not
/// coordinated; snapshots are full-state overwrites and last-write-wins is
/// the accepted consistency model.
pub struct SessionManager {
    clock: Clock,
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    generator: Option<Arc<dyn WordGenerator>>,
    session: Arc<Mutex<Option<VocabularySession>>>,
    autosave: Option<JoinHandle<()>>,
    config: SessionManagerConfig,
}

impl SessionManager {
    #[must_use]
    pub fn new(stores: Stores) -> Self {
        Self {
            clock: Clock::default_clock(),
            local: stores.local,
            remote: stores.remote,
            generator: None,
            session: Arc::new(Mutex::new(None)),
            autosave: None,
            config: SessionManagerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn WordGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionManagerConfig) -> Self {
        self.config = config;
        self
    }

    //
    // ─── CREATION ──────────────────────────────────────────────────────────
    //

    /// Start a new session from caller-supplied words.
    ///
    /// Replaces any session already held by this manager, persists the
    /// initial snapshot to both stores, and starts the periodic save.
    ///
    /// # Errors
    ///
    /// Returns `CreateSessionError::Session` if `words` is empty.
    pub async fn create_session(
        &mut self,
        student_id: StudentId,
        words: Vec<VocabularyCard>,
    ) -> Result<SessionProgress, CreateSessionError> {
        let session = VocabularySession::new(student_id, words, self.clock.now())?;
        Ok(self.install(session).await)
    }

    /// Start a new session from personalized generation.
    ///
    /// Retryable generation failures are retried under the configured
    /// backoff policy; the final failure is surfaced as a typed
    /// `GenerationError` so the caller can decide between retry and the
    /// explicit fallback path. No offline list is substituted here.
    ///
    /// # Errors
    ///
    /// Returns `CreateSessionError::GeneratorUnavailable` when no generator
    /// is configured, or the classified `GenerationError` from the endpoint.
    pub async fn create_generated_session(
        &mut self,
        profile: &StudentProfile,
        desired_count: usize,
    ) -> Result<SessionProgress, CreateSessionError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(CreateSessionError::GeneratorUnavailable)?
            .clone();
        let words =
            generate_with_retry(generator.as_ref(), profile, desired_count, self.config.retry)
                .await?;
        let session =
            VocabularySession::new(profile.student_id.clone(), words, self.clock.now())?;
        Ok(self.install(session).await)
    }

    /// Explicit fallback path: start a session from the offline word list.
    ///
    /// # Errors
    ///
    /// Returns `CreateSessionError::Session` if the offline list is empty,
    /// which would indicate a build problem.
    pub async fn create_fallback_session(
        &mut self,
        student_id: StudentId,
    ) -> Result<SessionProgress, CreateSessionError> {
        self.create_session(student_id, crate::fallback::fallback_words())
            .await
    }

    async fn install(&mut self, session: VocabularySession) -> SessionProgress {
        let record = SessionRecord::from_session(&session);
        let progress = session.progress();
        *self.session.lock().await = Some(session);

        save_snapshot(self.local.as_ref(), self.remote.as_ref(), &record).await;
        let progress_record = progress_from(&record, self.clock.now());
        save_progress(self.local.as_ref(), self.remote.as_ref(), &progress_record).await;

        self.start_autosave();
        progress
    }

    //
    // ─── NAVIGATION & READS ────────────────────────────────────────────────
    //

    /// Move to the next word.
    ///
    /// Returns the newly-current card, or `None` with the cursor unchanged
    /// at the last word (or with no active session). A successful move
    /// schedules a best-effort progress write; persistence failures never
    /// surface here.
    pub async fn navigate_next(&self) -> Option<VocabularyCard> {
        self.navigate(Direction::Forward).await
    }

    /// Move to the previous word. Boundary behavior mirrors
    /// [`Self::navigate_next`].
    pub async fn navigate_previous(&self) -> Option<VocabularyCard> {
        self.navigate(Direction::Backward).await
    }

    async fn navigate(&self, direction: Direction) -> Option<VocabularyCard> {
        let (card, record) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut()?;
            let card = match direction {
                Direction::Forward => session.advance()?.clone(),
                Direction::Backward => session.retreat()?.clone(),
            };
            (card, SessionRecord::from_session(session))
        };

        let progress_record = progress_from(&record, self.clock.now());
        save_progress(self.local.as_ref(), self.remote.as_ref(), &progress_record).await;
        Some(card)
    }

    /// The card under the cursor, or `None` with no active session.
    pub async fn current_word(&self) -> Option<VocabularyCard> {
        let guard = self.session.lock().await;
        guard.as_ref().map(|s| s.current_word().clone())
    }

    /// Progress of the active session; all-zero with no active session.
    pub async fn session_progress(&self) -> SessionProgress {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map_or_else(SessionProgress::none, VocabularySession::progress)
    }

    pub async fn has_active_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    //
    // ─── RECOVERY ──────────────────────────────────────────────────────────
    //

    /// Rehydrate a prior session for `student_id`, local store first.
    ///
    /// Malformed or mismatched local data is discarded and the remote store
    /// is consulted through the progress record's last session id. Returns
    /// `None` when neither source yields a valid, fresh, still-active
    /// session; "nothing to resume" is never an error.
    pub async fn recover_session(&mut self, student_id: &StudentId) -> Option<SessionProgress> {
        let now = self.clock.now();
        let session = match self.recover_from_local(student_id, now).await {
            Some(session) => Some(session),
            None => self.recover_from_remote(student_id, now).await,
        }?;
        Some(self.install(session).await)
    }

    async fn recover_from_local(
        &self,
        student_id: &StudentId,
        now: DateTime<Utc>,
    ) -> Option<VocabularySession> {
        let json = match self.local.get(keys::SESSION_KEY).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("local session read failed during recovery: {err}");
                return None;
            }
        };

        let record: SessionRecord = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(err) => {
                log::debug!("discarding malformed local session snapshot: {err}");
                let _ = self.local.remove(keys::SESSION_KEY).await;
                return None;
            }
        };

        if record.student_id != *student_id {
            return None;
        }
        self.accept_recovered(record, now)
    }

    async fn recover_from_remote(
        &self,
        student_id: &StudentId,
        now: DateTime<Utc>,
    ) -> Option<VocabularySession> {
        let progress = self.remote.get_progress(student_id).await.ok()?;
        let record = self
            .remote
            .get_session(&progress.last_session_id)
            .await
            .ok()?;
        if record.student_id != *student_id {
            return None;
        }
        self.accept_recovered(record, now)
    }

    fn accept_recovered(
        &self,
        record: SessionRecord,
        now: DateTime<Utc>,
    ) -> Option<VocabularySession> {
        if !record.is_active {
            return None;
        }
        let session = record.into_session().ok()?;
        if session.is_stale(now, self.config.staleness_window) {
            return None;
        }
        Some(session)
    }

    /// Cheap resumability check from the progress record alone, without
    /// loading any word list. Missing, expired, or unparsable data reads as
    /// `false`.
    pub async fn can_continue_from_last_memory(&self, student_id: &StudentId) -> bool {
        let now = self.clock.now();
        if let Ok(Some(json)) = self.local.get(&keys::progress_key(student_id)).await
            && let Ok(record) = serde_json::from_str::<ProgressRecord>(&json)
        {
            return record.is_resumable(now, self.config.staleness_window);
        }
        match self.remote.get_progress(student_id).await {
            Ok(record) => record.is_resumable(now, self.config.staleness_window),
            Err(_) => false,
        }
    }

    //
    // ─── SEEN WORDS ────────────────────────────────────────────────────────
    //

    /// Record a word as studied. Idempotent: re-adding a word leaves the
    /// stored set unchanged. Persistence is best-effort.
    pub async fn add_seen_word(&self, word: &str, student_id: &StudentId) {
        let mut words = self.seen_words(student_id).await;
        if words.iter().any(|w| w == word) {
            return;
        }
        words.push(word.to_string());

        let key = keys::seen_words_key(student_id);
        match serde_json::to_string(&words) {
            Ok(json) => {
                if let Err(err) = self.local.set(&key, &json).await {
                    log::warn!("local seen-words write failed: {err}");
                }
            }
            Err(err) => log::warn!("seen-words serialization failed: {err}"),
        }
        if let Err(err) = self.remote.upsert_seen_words(student_id, &words).await {
            log::debug!("remote seen-words write failed: {err}");
        }
    }

    /// The deduplicated list of previously studied words. Local store first;
    /// a device with no local copy seeds from the remote list.
    pub async fn seen_words(&self, student_id: &StudentId) -> Vec<String> {
        match self.local.get(&keys::seen_words_key(student_id)).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            _ => self
                .remote
                .get_seen_words(student_id)
                .await
                .unwrap_or_default(),
        }
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────
    //

    /// End the active session: final snapshot and progress write, timer
    /// stopped, in-memory state cleared. A no-op with no active session.
    /// Continuing afterwards always creates a new session.
    pub async fn end_session(&mut self) {
        self.stop_autosave();
        let record = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                return;
            };
            session.end();
            let record = SessionRecord::from_session(session);
            *guard = None;
            record
        };

        save_snapshot(self.local.as_ref(), self.remote.as_ref(), &record).await;
        let progress_record = progress_from(&record, self.clock.now());
        save_progress(self.local.as_ref(), self.remote.as_ref(), &progress_record).await;
    }

    /// Remove all on-device keys associated with `student_id` (session,
    /// progress, seen words). Best-effort cleanup: storage failures are
    /// swallowed, this never fails.
    pub async fn clear_session_data(&self, student_id: &StudentId) {
        let targets = [
            keys::SESSION_KEY.to_string(),
            keys::progress_key(student_id),
            keys::seen_words_key(student_id),
        ];
        for key in targets {
            if let Err(err) = self.local.remove(&key).await {
                log::debug!("best-effort removal of {key} failed: {err}");
            }
        }
    }

    /// Stop the periodic save and write a final best-effort snapshot.
    ///
    /// Safe to call repeatedly and on a manager with no active session. A
    /// save already in flight is allowed to complete or fail unobserved.
    pub async fn cleanup(&mut self) {
        self.stop_autosave();
        let record = {
            let guard = self.session.lock().await;
            guard.as_ref().map(SessionRecord::from_session)
        };
        if let Some(record) = record {
            save_snapshot(self.local.as_ref(), self.remote.as_ref(), &record).await;
        }
    }

    fn start_autosave(&mut self) {
        self.stop_autosave();
        let local = Arc::clone(&self.local);
        let remote = Arc::clone(&self.remote);
        let session = Arc::clone(&self.session);
        let period = self.config.save_interval;

        self.autosave = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; creation already saved.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let record = {
                    let guard = session.lock().await;
                    guard.as_ref().map(SessionRecord::from_session)
                };
                let Some(record) = record else {
                    continue;
                };
                save_snapshot(local.as_ref(), remote.as_ref(), &record).await;
            }
        }));
    }

    fn stop_autosave(&mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // The timer is owned by the instance; never let it outlive the
        // manager in tests spinning up many of them.
        self.stop_autosave();
    }
}

enum Direction {
    Forward,
    Backward,
}

fn progress_from(record: &SessionRecord, now: DateTime<Utc>) -> ProgressRecord {
    ProgressRecord {
        student_id: record.student_id.clone(),
        last_session_id: record.session_id.clone(),
        last_position: record.current_position,
        last_access_time: now,
        total_words_studied: record.current_position + 1,
        session_duration_secs: (now - record.start_time).num_seconds().max(0),
    }
}

/// Full-state snapshot write to both stores. Failures are logged, not
/// returned: the next tick or navigation retries with fresher state anyway.
async fn save_snapshot(local: &dyn LocalStore, remote: &dyn RemoteStore, record: &SessionRecord) {
    match serde_json::to_string(record) {
        Ok(json) => {
            if let Err(err) = local.set(keys::SESSION_KEY, &json).await {
                log::warn!("local session save failed, retrying next tick: {err}");
            }
        }
        Err(err) => log::warn!("session snapshot serialization failed: {err}"),
    }
    if let Err(err) = remote.upsert_session(record).await {
        log::warn!("remote session save failed, retrying next tick: {err}");
    }
}

async fn save_progress(local: &dyn LocalStore, remote: &dyn RemoteStore, record: &ProgressRecord) {
    let key = keys::progress_key(&record.student_id);
    match serde_json::to_string(record) {
        Ok(json) => {
            if let Err(err) = local.set(&key, &json).await {
                log::warn!("local progress write failed: {err}");
            }
        }
        Err(err) => log::warn!("progress serialization failed: {err}"),
    }
    if let Err(err) = remote.upsert_progress(record).await {
        log::debug!("remote progress write failed: {err}");
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
