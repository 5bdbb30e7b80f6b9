//! Per-session conversation state.
//!
//! Sessions live in memory behind a `RwLock`ed map of `Arc<Mutex<Session>>`.
//! Callers take the per-session mutex for the whole turn, so each session
//! has a single writer while different sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patients::PatientRecord;

/// Which handler produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Administrative and identification turns.
    Receptionist,
    /// Medical question turns.
    Clinical,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Receptionist => f.write_str("receptionist"),
            Self::Clinical => f.write_str("clinical"),
        }
    }
}

/// One completed exchange within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// What the patient said.
    pub user_message: String,
    /// What the assistant replied.
    pub response: String,
    /// Which handler answered.
    pub handler: HandlerKind,
}

/// Conversation state for one session key.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Discharge record cached after a successful lookup. Once set it is
    /// only replaced by another successful lookup, never cleared.
    pub patient_record: Option<PatientRecord>,
    /// Handler that served the most recent turn.
    pub current_handler: Option<HandlerKind>,
    /// Completed turns, oldest first.
    pub turns: Vec<Turn>,
}

impl Session {
    /// Appends a completed turn and records the serving handler.
    pub fn append_turn(&mut self, user_message: &str, response: &str, handler: HandlerKind) {
        self.turns.push(Turn {
            user_message: user_message.to_string(),
            response: response.to_string(),
            handler,
        });
        self.current_handler = Some(handler);
    }

    /// Caches a discharge record for the session.
    pub fn set_patient_record(&mut self, record: PatientRecord) {
        self.patient_record = Some(record);
    }
}

/// In-memory store of sessions keyed by caller-chosen identifier.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `key`, inserting a fresh one if absent.
    ///
    /// The returned handle is locked by the caller for the duration of the
    /// turn, serializing turns within a session.
    pub fn get_or_create(&self, key: &str) -> Arc<tokio::sync::Mutex<Session>> {
        if let Some(existing) = self.read_map().get(key) {
            return Arc::clone(existing);
        }

        let mut map = self.write_map();
        // Re-check: another task may have inserted between the locks.
        if let Some(existing) = map.get(key) {
            return Arc::clone(existing);
        }
        debug!(session = key, "creating session");
        let session = Arc::new(tokio::sync::Mutex::new(Session::default()));
        map.insert(key.to_string(), Arc::clone(&session));
        session
    }

    /// Number of sessions ever created and still held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    /// Returns `true` if no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    fn read_map(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<Session>>>> {
        self.sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_map(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<Session>>>> {
        self.sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
