use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::HistoryPolicy;
use crate::{Transcript, Turn};

/// Shared reference to one session's transcript.
///
/// Each session has its own lock, so turns on the same session serialize
/// while other sessions proceed independently.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    transcript: Arc<Mutex<Transcript>>,
}

impl SessionHandle {
    fn new(id: &str, policy: HistoryPolicy) -> Self {
        Self {
            id: Arc::from(id),
            transcript: Arc::new(Mutex::new(Transcript::with_policy(policy))),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock the transcript for reading or appending.
    pub async fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().await
    }

    /// Clone the current transcript.
    pub async fn snapshot(&self) -> Transcript {
        self.transcript.lock().await.clone()
    }
}

/// In-memory map from session identifier to transcript.
///
/// Sessions are created lazily on first reference and live until the store
/// is dropped. Nothing is persisted.
#[derive(Debug, Default)]
pub struct HistoryStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    policy: HistoryPolicy,
}

impl HistoryStore {
    /// Create an empty store whose transcripts are never trimmed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store applying `policy` to every new transcript.
    #[must_use]
    pub fn with_policy(policy: HistoryPolicy) -> Self {
        info!(
            "History store created (max_turns={:?}, max_chars={:?})",
            policy.max_turns, policy.max_chars
        );
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// Return the session registered under `session_id`, creating an empty
    /// one if it does not exist yet.
    #[must_use]
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().get(session_id) {
            return handle.clone();
        }

        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Created session: {session_id}");
                SessionHandle::new(session_id, self.policy)
            })
            .clone()
    }

    /// Append a turn to `session_id`, creating the session if absent.
    ///
    /// Waits for the session lock; do not call this while already holding a
    /// guard from [`SessionHandle::lock`] on the same session.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let handle = self.get_or_create(session_id);
        handle.lock().await.append(turn);
    }

    /// Clone the transcript of `session_id`, creating the session if absent.
    pub async fn snapshot(&self, session_id: &str) -> Transcript {
        self.get_or_create(session_id).snapshot().await
    }

    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// All known session identifiers, sorted.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[tokio::test]
    async fn get_or_create_is_lazy_and_stable() {
        let store = HistoryStore::new();
        assert!(!store.contains("s1"));

        let first = store.get_or_create("s1");
        assert!(store.contains("s1"));
        assert!(first.lock().await.is_empty());

        first.lock().await.append(Turn::user("olá"));
        let second = store.get_or_create("s1");
        assert_eq!(second.lock().await.len(), 1);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn append_creates_missing_session() {
        let store = HistoryStore::new();
        store.append("fresh", Turn::user("primeira")).await;

        let transcript = store.snapshot("fresh").await;
        assert_eq!(transcript.turns(), &[Turn::user("primeira")]);
    }

    #[tokio::test]
    async fn n_exchanges_yield_2n_alternating_turns() {
        let store = HistoryStore::new();
        for i in 0..7 {
            store.append("s", Turn::user(format!("q{i}"))).await;
            store.append("s", Turn::assistant(format!("a{i}"))).await;
        }

        let transcript = store.snapshot("s").await;
        assert_eq!(transcript.len(), 14);
        for (i, turn) in transcript.turns().iter().enumerate() {
            let expected_role = if i % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            assert_eq!(turn.role(), expected_role);
            let prefix = if i % 2 == 0 { 'q' } else { 'a' };
            assert_eq!(turn.text(), format!("{prefix}{}", i / 2));
        }
    }

    #[tokio::test]
    async fn sessions_do_not_share_turns() {
        let store = HistoryStore::new();
        store.append("a", Turn::user("only in a")).await;
        store.append("a", Turn::assistant("reply in a")).await;

        let other = store.snapshot("b").await;
        assert!(other.is_empty());

        store.append("b", Turn::user("only in b")).await;
        let a = store.snapshot("a").await;
        assert_eq!(a.len(), 2);
        assert!(a.turns().iter().all(|t| t.text().ends_with(" a")));
        assert_eq!(store.session_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn snapshot_is_detached_copy() {
        let store = HistoryStore::new();
        store.append("s", Turn::user("one")).await;

        let snapshot = store.snapshot("s").await;
        store.append("s", Turn::assistant("two")).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.snapshot("s").await.len(), 2);
    }

    #[tokio::test]
    async fn store_policy_reaches_new_sessions() {
        let store = HistoryStore::with_policy(HistoryPolicy::default().with_max_turns(2));
        for i in 0..3 {
            store.append("s", Turn::user(format!("q{i}"))).await;
            store.append("s", Turn::assistant(format!("a{i}"))).await;
        }

        let transcript = store.snapshot("s").await;
        assert_eq!(transcript.turns(), &[Turn::user("q2"), Turn::assistant("a2")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sessions_keep_their_own_order() {
        let store = Arc::new(HistoryStore::new());
        let mut tasks = Vec::new();

        for session in 0..8 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let id = format!("session-{session}");
                for i in 0..25 {
                    store.append(&id, Turn::user(format!("{i}"))).await;
                }
            }));
        }
        for task in tasks {
            assert!(task.await.is_ok());
        }

        assert_eq!(store.session_count(), 8);
        for session in 0..8 {
            let transcript = store.snapshot(&format!("session-{session}")).await;
            let texts: Vec<&str> = transcript.turns().iter().map(Turn::text).collect();
            let expected: Vec<String> = (0..25).map(|i| i.to_string()).collect();
            assert_eq!(texts, expected);
        }
    }
}
