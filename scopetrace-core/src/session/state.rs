//! Session state held under the profiler lock

use std::path::PathBuf;

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::timing::TimeoutWatcher;
use crate::trace::{Event, EventBuffer, StringInterner};

use super::SessionInfo;

/// Everything a running session owns
pub(super) struct ActiveSession {
    pub(super) session_id: Uuid,
    pub(super) output_path: PathBuf,
    pub(super) started_at: DateTime<Local>,
    pub(super) buffer: EventBuffer,
    pub(super) names: StringInterner,
    pub(super) categories: StringInterner,
    pub(super) watcher: Option<TimeoutWatcher>,
}

impl ActiveSession {
    pub(super) fn new(
        session_id: Uuid,
        output_path: PathBuf,
        capacity: usize,
        started_at: DateTime<Local>,
        watcher: Option<TimeoutWatcher>,
    ) -> Self {
        Self {
            session_id,
            output_path,
            started_at,
            buffer: EventBuffer::new(capacity),
            names: StringInterner::new(),
            categories: StringInterner::new(),
            watcher,
        }
    }

    /// Intern the event's strings and append it; true once the buffer is full
    pub(super) fn record(&mut self, event: Event, name: &'static str, category: &'static str) -> bool {
        self.names.insert(event.name_hash, name);
        self.categories.insert(event.category_hash, category);

        match self.buffer.push(event) {
            Ok(full) => full,
            Err(_) => true,
        }
    }

    pub(super) fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id,
            output_path: self.output_path.clone(),
            capacity: self.buffer.capacity(),
            recorded: self.buffer.len(),
            started_at: self.started_at,
        }
    }
}

/// Lifecycle state
pub(super) enum SessionState {
    Idle,
    Running(ActiveSession),
    /// The trace is being written; no new session may start yet
    Ending,
}

impl SessionState {
    pub(super) fn is_running(&self) -> bool {
        matches!(self, SessionState::Running(_))
    }

    pub(super) fn is_ending(&self) -> bool {
        matches!(self, SessionState::Ending)
    }

    /// Move a running session out, leaving `Ending`
    pub(super) fn take_running(&mut self) -> Option<ActiveSession> {
        if !self.is_running() {
            return None;
        }
        match std::mem::replace(self, SessionState::Ending) {
            SessionState::Running(active) => Some(active),
            _ => None,
        }
    }

    /// `Ending` → `Idle`
    pub(super) fn finish_ending(&mut self) {
        if self.is_ending() {
            *self = SessionState::Idle;
        }
    }
}
