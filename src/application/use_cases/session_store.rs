//! In-memory per-session state: upload history, the selected entry and its
//! chat log. Every session owns its tables; nothing is shared across sessions.
//! Sessions idle longer than the TTL expire, and the least recently used one
//! is dropped when the store is full.

use crate::domain::chat::ChatMessage;
use crate::domain::error::{AppError, Result};
use crate::domain::session::{HistoryEntry, HistorySummary};
use crate::domain::table::Table;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_MAX_SESSIONS: usize = 100;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Session {
    history: Vec<HistoryEntry>,
    selected: Option<Uuid>,
    last_access: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            selected: None,
            last_access: Instant::now(),
        }
    }

    fn selected_entry(&self) -> Option<&HistoryEntry> {
        let id = self.selected?;
        self.history.iter().find(|entry| entry.id == id)
    }

}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    max_entries: usize,
    max_sessions: usize,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_entries: usize) -> Self {
        Self::with_limits(max_entries, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }

    pub fn with_limits(max_entries: usize, max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            max_sessions: max_sessions.max(1),
            ttl,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Session>>> {
        self.sessions
            .lock()
            .map_err(|e| AppError::Internal(format!("Session store lock poisoned: {}", e)))
    }

    fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut sessions = self.lock()?;
        if sessions
            .get(&id)
            .is_some_and(|session| session.last_access.elapsed() > self.ttl)
        {
            sessions.remove(&id);
            debug!(session = %id, "session expired");
        }
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
        session.last_access = Instant::now();
        f(session)
    }

    /// Opens a session after dropping expired ones and, at capacity, the
    /// least recently used one.
    pub fn create_session(&self) -> Result<Uuid> {
        let mut sessions = self.lock()?;

        let before = sessions.len();
        sessions.retain(|_, session| session.last_access.elapsed() <= self.ttl);
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "expired sessions dropped");
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_access)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            info!(session = %oldest, "least recently used session evicted");
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new());
        info!(session = %id, "session created");
        Ok(id)
    }

    pub fn delete_session(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    pub fn session_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self
            .lock()?
            .get(&id)
            .is_some_and(|session| session.last_access.elapsed() <= self.ttl))
    }

    /// Records a new upload and selects it. The oldest entry is evicted once
    /// the history exceeds its cap.
    pub fn add_upload(&self, id: Uuid, file_name: &str, table: Arc<Table>) -> Result<Uuid> {
        let max_entries = self.max_entries;
        self.with_session(id, |session| {
            let entry = HistoryEntry::new(file_name, table);
            let entry_id = entry.id;
            session.history.push(entry);
            session.selected = Some(entry_id);

            while session.history.len() > max_entries {
                let evicted = session.history.remove(0);
                debug!(session = %id, entry = %evicted.id, "history entry evicted");
            }
            Ok(entry_id)
        })
    }

    /// Table of the selected history entry.
    pub fn current_table(&self, id: Uuid) -> Result<Option<Arc<Table>>> {
        Ok(self.current_entry(id)?.map(|(_, table)| table))
    }

    /// Id and table of the selected history entry.
    pub fn current_entry(&self, id: Uuid) -> Result<Option<(Uuid, Arc<Table>)>> {
        self.with_session(id, |session| {
            Ok(session
                .selected_entry()
                .map(|entry| (entry.id, Arc::clone(&entry.table))))
        })
    }

    pub fn history(&self, id: Uuid) -> Result<Vec<HistorySummary>> {
        self.with_session(id, |session| {
            Ok(session
                .history
                .iter()
                .map(|entry| entry.summary(session.selected == Some(entry.id)))
                .collect())
        })
    }

    /// Makes a past upload current again, together with its chat.
    pub fn restore(&self, id: Uuid, entry_id: Uuid) -> Result<HistorySummary> {
        self.with_session(id, |session| {
            let entry = session
                .history
                .iter()
                .find(|entry| entry.id == entry_id)
                .ok_or_else(|| AppError::NotFound(format!("history entry {}", entry_id)))?;
            let summary = entry.summary(true);
            session.selected = Some(entry_id);
            Ok(summary)
        })
    }

    /// Deselects the current entry so the next upload starts fresh.
    pub fn new_file(&self, id: Uuid) -> Result<()> {
        self.with_session(id, |session| {
            session.selected = None;
            Ok(())
        })
    }

    pub fn clear(&self, id: Uuid) -> Result<()> {
        self.with_session(id, |session| {
            session.history.clear();
            session.selected = None;
            Ok(())
        })?;
        info!(session = %id, "history cleared");
        Ok(())
    }

    /// Appends to the chat of `entry_id`, selected or not.
    pub fn append_chat(&self, id: Uuid, entry_id: Uuid, messages: Vec<ChatMessage>) -> Result<()> {
        self.with_session(id, |session| {
            let entry = session
                .history
                .iter_mut()
                .find(|entry| entry.id == entry_id)
                .ok_or_else(|| AppError::NotFound(format!("history entry {}", entry_id)))?;
            entry.chat_history.extend(messages);
            Ok(())
        })
    }

    /// Chat of the selected entry; empty when nothing is selected.
    pub fn chat_history(&self, id: Uuid) -> Result<Vec<ChatMessage>> {
        self.with_session(id, |session| {
            Ok(session
                .selected_entry()
                .map(|entry| entry.chat_history.clone())
                .unwrap_or_default())
        })
    }
}
