use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::{LoadError, MemoryStorage, SessionStorage};

/// Minimal identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// A complete session. Token and user always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
            created_at: Utc::now(),
        }
    }

    /// Minutes since login (for display only, sessions never expire locally)
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes().max(0)
    }
}

/// Session validity as observed by the rest of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Process-wide session handle.
///
/// Clones share the same state, so a `set_session` through one handle is
/// visible through every other handle immediately. Writes are
/// last-write-wins; every write is mirrored to the durable storage backend.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Option<SessionData>>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Open the store, restoring whatever session the storage backend holds.
    ///
    /// The client always starts, unauthenticated when nothing usable is
    /// stored. Corrupt records are discarded; a backend that is only
    /// unavailable keeps its record for the next run.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let restored = match storage.load() {
            Ok(Some(data)) if data.token.is_empty() => {
                warn!("Stored session has an empty token, discarding");
                Self::discard(storage.as_ref());
                None
            }
            Ok(data) => data,
            Err(e @ LoadError::Corrupt(_)) => {
                warn!(error = %e, "Discarding unreadable session");
                Self::discard(storage.as_ref());
                None
            }
            Err(e @ LoadError::Unavailable(_)) => {
                warn!(error = %e, "Session storage unavailable, starting logged out");
                None
            }
        };

        if let Some(ref data) = restored {
            debug!(email = %data.user.email, "Restored session");
        }

        Self {
            state: Arc::new(RwLock::new(restored)),
            storage,
        }
    }

    /// A store that only lives as long as the process.
    pub fn ephemeral() -> Self {
        Self::open(Arc::new(MemoryStorage::default()))
    }

    /// Store a new session and persist it.
    ///
    /// The in-memory state is updated before persisting, so readers observe
    /// the new session even when the backend write fails.
    pub fn set_session(&self, token: impl Into<String>, user: User) -> Result<()> {
        let data = SessionData::new(token, user);
        *self.write() = Some(data.clone());
        self.storage.save(&data)
    }

    /// Drop the current session and persist the logged-out state. Idempotent.
    pub fn clear_session(&self) -> Result<()> {
        *self.write() = None;
        self.storage.clear()
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|d| d.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|d| d.user.clone())
    }

    /// Copy of the full session, if any
    pub fn snapshot(&self) -> Option<SessionData> {
        self.read().clone()
    }

    pub fn state(&self) -> AuthState {
        if self.read().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    fn discard(storage: &dyn SessionStorage) {
        if let Err(e) = storage.clear() {
            warn!(error = %e, "Failed to remove unreadable session");
        }
    }

    // Every write replaces the whole Option, so a poisoned lock still holds
    // a complete session.
    fn read(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::auth::FileStorage;

    /// Storage whose reads always fail, recording whether it was cleared
    struct FailingStorage {
        corrupt: bool,
        cleared: AtomicBool,
    }

    impl FailingStorage {
        fn new(corrupt: bool) -> Self {
            Self {
                corrupt,
                cleared: AtomicBool::new(false),
            }
        }
    }

    impl SessionStorage for FailingStorage {
        fn load(&self) -> std::result::Result<Option<SessionData>, LoadError> {
            if self.corrupt {
                Err(LoadError::Corrupt("bad json".to_string()))
            } else {
                Err(LoadError::Unavailable(anyhow::anyhow!("keychain locked")))
            }
        }

        fn save(&self, _data: &SessionData) -> Result<()> {
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            self.cleared.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn demo_user() -> User {
        User::new("u1", "a@b.com")
    }

    fn assert_consistent(store: &SessionStore) {
        assert_eq!(store.token().is_some(), store.user().is_some());
    }

    #[test]
    fn test_initial_state_is_unauthenticated() {
        let store = SessionStore::ephemeral();
        assert_eq!(store.state(), AuthState::Unauthenticated);
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn test_set_session_is_visible_immediately() {
        let store = SessionStore::ephemeral();
        store.set_session("tok1", demo_user()).unwrap();

        assert_eq!(store.token().as_deref(), Some("tok1"));
        assert_eq!(store.user(), Some(demo_user()));
        assert_eq!(store.state(), AuthState::Authenticated);
        assert_consistent(&store);
    }

    #[test]
    fn test_last_set_wins() {
        let store = SessionStore::ephemeral();
        store.set_session("first", demo_user()).unwrap();
        store
            .set_session("second", User::new("u2", "c@d.com"))
            .unwrap();

        assert_eq!(store.token().as_deref(), Some("second"));
        assert_eq!(store.user().map(|u| u.email), Some("c@d.com".to_string()));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::ephemeral();
        let view = store.clone();

        store.set_session("shared", demo_user()).unwrap();
        assert_eq!(view.token().as_deref(), Some("shared"));

        view.clear_session().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let store = SessionStore::ephemeral();
        store.set_session("tok", demo_user()).unwrap();

        store.clear_session().unwrap();
        let after_once = (store.token(), store.user(), store.state());
        store.clear_session().unwrap();
        let after_twice = (store.token(), store.user(), store.state());

        assert_eq!(after_once, after_twice);
        assert_eq!(after_twice.2, AuthState::Unauthenticated);
        assert_consistent(&store);
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()));

        let store = SessionStore::open(storage.clone());
        store.set_session("tok1", demo_user()).unwrap();
        drop(store);

        let reopened = SessionStore::open(storage);
        assert_eq!(reopened.token().as_deref(), Some("tok1"));
        assert_eq!(reopened.user(), Some(demo_user()));
    }

    #[test]
    fn test_cleared_session_stays_cleared_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()));

        let store = SessionStore::open(storage.clone());
        store.set_session("tok1", demo_user()).unwrap();
        store.clear_session().unwrap();

        let reopened = SessionStore::open(storage);
        assert!(!reopened.is_authenticated());
    }

    #[test]
    fn test_corrupt_session_file_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        std::fs::write(storage.path(), "{ not json").unwrap();

        let store = SessionStore::open(Arc::new(storage));
        assert!(!store.is_authenticated());
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_unavailable_storage_keeps_stored_session() {
        let storage = Arc::new(FailingStorage::new(false));

        let store = SessionStore::open(storage.clone());
        assert!(!store.is_authenticated());
        assert!(!storage.cleared.load(Ordering::SeqCst));
    }

    #[test]
    fn test_corrupt_storage_is_cleared() {
        let storage = Arc::new(FailingStorage::new(true));

        let store = SessionStore::open(storage.clone());
        assert!(!store.is_authenticated());
        assert!(storage.cleared.load(Ordering::SeqCst));
    }

    #[test]
    fn test_empty_token_is_discarded() {
        let storage = Arc::new(MemoryStorage::default());
        storage.save(&SessionData::new("", demo_user())).unwrap();

        let store = SessionStore::open(storage);
        assert_eq!(store.state(), AuthState::Unauthenticated);
        assert_consistent(&store);
    }

    #[test]
    fn test_session_data_age_minutes() {
        let mut data = SessionData::new("tok", demo_user());
        assert_eq!(data.age_minutes(), 0);

        data.created_at = Utc::now() - chrono::Duration::minutes(90);
        assert!(data.age_minutes() >= 90);
    }

    #[test]
    fn test_session_data_without_created_at_parses() {
        let json = r#"{"token":"tok","user":{"id":"u1","email":"a@b.com"}}"#;
        let data: SessionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.token, "tok");
        assert_eq!(data.user, demo_user());
    }
}
