use cadence_quiz::funnel::handoff::{HandoffEntries, HandoffStore, SessionId, StoreError};
use cadence_quiz::funnel::leads::{KlaviyoClient, LeadForwarder};
use cadence_quiz::funnel::offer::BONUS_WINDOW_MINUTES;
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared state for the quiz endpoints.
#[derive(Clone)]
pub(crate) struct QuizState {
    pub(crate) handoffs: Arc<InMemoryHandoffStore>,
    pub(crate) leads: LeadForwarder<KlaviyoClient>,
}

impl QuizState {
    pub(crate) fn new(leads: LeadForwarder<KlaviyoClient>) -> Self {
        Self {
            handoffs: Arc::new(InMemoryHandoffStore::default()),
            leads,
        }
    }
}

/// Process-local hand-off store. Unread entries are dropped once they outlive
/// the retention window, checked whenever a new session is saved.
pub(crate) struct InMemoryHandoffStore {
    sessions: Mutex<HashMap<SessionId, StoredHandoff>>,
    retention: Duration,
}

struct StoredHandoff {
    saved_at: DateTime<Utc>,
    entries: HandoffEntries,
}

impl Default for InMemoryHandoffStore {
    fn default() -> Self {
        Self::with_retention(Duration::minutes(BONUS_WINDOW_MINUTES))
    }
}

impl InMemoryHandoffStore {
    pub(crate) fn with_retention(retention: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            retention,
        }
    }

    fn save_at(
        &self,
        session: &SessionId,
        entries: HandoffEntries,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("hand-off mutex poisoned".to_string()))?;

        let before = guard.len();
        guard.retain(|_, stored| now - stored.saved_at < self.retention);
        let evicted = before - guard.len();
        if evicted > 0 {
            debug!(evicted, "dropped unread hand-off sessions");
        }

        if guard.contains_key(session) {
            return Err(StoreError::Conflict(session.clone()));
        }
        guard.insert(
            session.clone(),
            StoredHandoff {
                saved_at: now,
                entries,
            },
        );
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl HandoffStore for InMemoryHandoffStore {
    fn save(&self, session: &SessionId, entries: HandoffEntries) -> Result<(), StoreError> {
        self.save_at(session, entries, Utc::now())
    }

    fn take(&self, session: &SessionId) -> Result<Option<HandoffEntries>, StoreError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("hand-off mutex poisoned".to_string()))?;
        Ok(guard.remove(session).map(|stored| stored.entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_entries() {
        let store = InMemoryHandoffStore::default();
        let session = SessionId::new("quiz-test-1");
        let mut entries = HandoffEntries::new();
        entries.insert("user_info".to_string(), "{}".to_string());

        store.save(&session, entries.clone()).expect("save");

        assert_eq!(store.take(&session).expect("take"), Some(entries));
        assert_eq!(store.take(&session).expect("take"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn saving_twice_conflicts() {
        let store = InMemoryHandoffStore::default();
        let session = SessionId::new("quiz-test-2");

        store.save(&session, HandoffEntries::new()).expect("save");
        let err = store
            .save(&session, HandoffEntries::new())
            .expect_err("conflict");

        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn unread_sessions_expire_on_later_saves() {
        let store = InMemoryHandoffStore::default();
        let start = Utc::now();

        for id in 0..50 {
            store
                .save_at(&SessionId::new(format!("quiz-old-{id}")), HandoffEntries::new(), start)
                .expect("save");
        }
        assert_eq!(store.len(), 50);

        let later = start + Duration::minutes(BONUS_WINDOW_MINUTES);
        let fresh = SessionId::new("quiz-fresh");
        store
            .save_at(&fresh, HandoffEntries::new(), later)
            .expect("save");

        assert_eq!(store.len(), 1);
        assert_eq!(store.take(&SessionId::new("quiz-old-0")).expect("take"), None);
        assert!(store.take(&fresh).expect("take").is_some());
    }

    #[test]
    fn sessions_inside_the_window_are_kept() {
        let store = InMemoryHandoffStore::with_retention(Duration::minutes(5));
        let start = Utc::now();
        let early = SessionId::new("quiz-early");

        store
            .save_at(&early, HandoffEntries::new(), start)
            .expect("save");
        store
            .save_at(
                &SessionId::new("quiz-late"),
                HandoffEntries::new(),
                start + Duration::minutes(4),
            )
            .expect("save");

        assert_eq!(store.len(), 2);
        assert!(store.take(&early).expect("take").is_some());
    }
}
