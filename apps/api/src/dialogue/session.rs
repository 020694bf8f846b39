//! Sessions and the store that owns them.
//!
//! A session is keyed by (mode, opaque id), so modes never share a log.
//! The store hands out `Arc<Mutex<Session>>`; holding the mutex for the whole
//! of `submit`/`advance` serialises concurrent requests for one session id.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::dialogue::message_log::MessageLog;
use crate::dialogue::stages::Mode;
use crate::errors::AppError;

const MAX_SESSION_ID_LEN: usize = 128;

/// Where a session is in its mode's stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageState {
    /// Waiting for the user's fields for `stage`.
    Collecting { stage: usize },
    /// User input for `stage` is logged at ordinal `input`; the model call is pending.
    Generating { stage: usize, input: usize },
    Complete,
}

impl StageState {
    pub fn stage(&self) -> Option<usize> {
        match self {
            StageState::Collecting { stage } | StageState::Generating { stage, .. } => Some(*stage),
            StageState::Complete => None,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    id: String,
    state: StageState,
    log: MessageLog,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new(mode: Mode, id: String) -> Self {
        Self {
            mode,
            id,
            state: StageState::Collecting { stage: 1 },
            log: MessageLog::new(),
            created_at: Utc::now(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Mutation is reserved for the controller.

    pub(super) fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    pub(super) fn transition(&mut self, next: StageState) {
        debug!(mode = %self.mode, session = %self.id, from = ?self.state, to = ?next, "Stage transition");
        self.state = next;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    mode: Mode,
    id: String,
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Owns every live session for the lifetime of the process.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: returns the existing session or creates a fresh one at stage 1.
    pub async fn get_or_create(&self, mode: Mode, id: &str) -> SessionHandle {
        let key = SessionKey {
            mode,
            id: id.to_string(),
        };

        if let Some(existing) = self.sessions.read().await.get(&key) {
            return existing.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key)
            .or_insert_with(|| {
                debug!(%mode, session = id, "Session created");
                Arc::new(Mutex::new(Session::new(mode, id.to_string())))
            })
            .clone()
    }

    pub async fn get(&self, mode: Mode, id: &str) -> Option<SessionHandle> {
        let key = SessionKey {
            mode,
            id: id.to_string(),
        };
        self.sessions.read().await.get(&key).cloned()
    }

    /// Discards all state for the key. Returns whether a session existed.
    pub async fn reset(&self, mode: Mode, id: &str) -> bool {
        let key = SessionKey {
            mode,
            id: id.to_string(),
        };
        self.sessions.write().await.remove(&key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session. Called on shutdown.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

/// Session ids are opaque to the controller but must be safe to echo and log.
pub fn validate_session_id(id: &str) -> Result<(), AppError> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
        return Err(AppError::Validation(format!(
            "session id must be 1-{MAX_SESSION_ID_LEN} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "session id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::message_log::Role;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = SessionStore::new();
        let first = store.get_or_create(Mode::Exploration, "abc").await;
        first.lock().await.log_mut().append(Role::User, 1, "hello");

        let second = store.get_or_create(Mode::Exploration, "abc").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.log().messages().len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_new_session_starts_collecting_stage_one() {
        let store = SessionStore::new();
        let handle = store.get_or_create(Mode::Decision, "s1").await;
        let session = handle.lock().await;
        assert_eq!(session.state(), StageState::Collecting { stage: 1 });
        assert!(session.log().is_empty());
        assert_eq!(session.mode(), Mode::Decision);
        assert_eq!(session.id(), "s1");
    }

    #[tokio::test]
    async fn test_modes_have_separate_namespaces() {
        let store = SessionStore::new();
        let exploration = store.get_or_create(Mode::Exploration, "same").await;
        let company = store.get_or_create(Mode::Company, "same").await;
        assert!(!Arc::ptr_eq(&exploration, &company));

        exploration.lock().await.log_mut().append(Role::User, 1, "private");
        assert!(company.lock().await.log().is_empty());
    }

    #[tokio::test]
    async fn test_reset_discards_state() {
        let store = SessionStore::new();
        let handle = store.get_or_create(Mode::Panoramic, "r").await;
        handle.lock().await.log_mut().append(Role::User, 1, "x");

        assert!(store.reset(Mode::Panoramic, "r").await);
        assert!(!store.reset(Mode::Panoramic, "r").await);
        assert!(store.get(Mode::Panoramic, "r").await.is_none());

        let fresh = store.get_or_create(Mode::Panoramic, "r").await;
        assert!(fresh.lock().await.log().is_empty());
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let store = SessionStore::new();
        store.get_or_create(Mode::Company, "a").await;
        store.get_or_create(Mode::Company, "b").await;
        store.clear().await;
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("3f1c-ab_9").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc").is_err());
        assert!(validate_session_id("有中文").is_err());
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_stage_state_accessor() {
        assert_eq!(StageState::Collecting { stage: 2 }.stage(), Some(2));
        assert_eq!(StageState::Generating { stage: 3, input: 4 }.stage(), Some(3));
        assert_eq!(StageState::Complete.stage(), None);
    }
}
