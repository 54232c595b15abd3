//! # Session lifecycle
//!
//! A [`Profiler`] owns at most one profiling session at a time and drives it
//! through a small state machine:
//!
//! ```text
//!            begin_session                 end_session / buffer full / timeout
//!   Idle ─────────────────────► Running ─────────────────────────────────────► Ending ──► Idle
//!    ▲                             │ report_event                                 │
//!    │                             └──────────────┘                               │
//!    └──────────────────────────── trace written ─────────────────────────────────┘
//! ```
//!
//! All mutation of the buffer, the interners and the state itself happens
//! under one mutex. The terminal path takes the running session out of the
//! lock (leaving `Ending`), stops the timeout watcher and writes the trace
//! without holding the lock, then returns to `Idle`. Whichever of manual end,
//! overflow or timeout moves `Running` to `Ending` first is the one that
//! writes the file; the others find the session gone and do nothing.

mod state;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use chrono::{DateTime, Local};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use uuid::Uuid;

use crate::config::{ActivePolicy, SessionConfig};
use crate::error::{ProfilerError, Result};
use crate::recorder::Recorder;
use crate::timing::{TimeoutWatcher, Timestamp};
use crate::trace::{Event, TraceSerializer};

use state::{ActiveSession, SessionState};

/// Verbosity value that lets every event through
pub const UNLIMITED_VERBOSITY: usize = 0;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// `end_session` was called
    Manual,
    /// The event buffer reached capacity
    BufferFull,
    /// The configured timeout elapsed
    Timeout,
    /// A new session replaced it under `ActivePolicy::Restart`
    Restarted,
    /// The last profiler handle was dropped
    Dropped,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            EndReason::Manual => "manual",
            EndReason::BufferFull => "buffer_full",
            EndReason::Timeout => "timeout",
            EndReason::Restarted => "restarted",
            EndReason::Dropped => "dropped",
        };
        f.write_str(reason)
    }
}

/// Outcome of a successfully written session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    /// Session identifier
    pub session_id: Uuid,
    /// File the trace was written to
    pub path: PathBuf,
    /// Number of events written
    pub event_count: usize,
    /// Why the session ended
    pub reason: EndReason,
    /// Interned strings that collided with a different string's hash
    pub collisions: usize,
}

/// Snapshot of the running session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// Session identifier
    pub session_id: Uuid,
    /// Resolved trace file path
    pub output_path: PathBuf,
    /// Maximum number of events
    pub capacity: usize,
    /// Events recorded so far
    pub recorded: usize,
    /// Local wall-clock start time
    pub started_at: DateTime<Local>,
}

/// What happened to a reported event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The verbosity gate discarded it
    Filtered,
    /// It was appended to the buffer
    Recorded,
    /// It filled the buffer, and the session was written and ended
    SessionEnded(TraceSummary),
}

/// Callback invoked after every terminal serialization
pub type EndHook = Arc<dyn Fn(EndReason, &Result<TraceSummary>) + Send + Sync>;

struct Shared {
    state: Mutex<SessionState>,
    /// Signalled whenever `Ending` returns to `Idle`
    ended: Condvar,
    verbosity: AtomicUsize,
    end_hook: Option<EndHook>,
}

/// Handle to a profiling session controller
///
/// Cloning is cheap; every clone controls the same session. The session is
/// ended and written when the last handle is dropped.
///
/// ```rust,no_run
/// use scopetrace_core::{Profiler, SessionConfig};
///
/// let profiler = Profiler::new();
/// profiler.begin_session(SessionConfig::new(1 << 20, "trace.json"))?;
/// {
///     let _scope = profiler.record("load_assets", "io");
///     // measured work
/// }
/// profiler.end_session()?;
/// # Ok::<(), scopetrace_core::ProfilerError>(())
/// ```
#[derive(Clone)]
pub struct Profiler {
    shared: Arc<Shared>,
}

static GLOBAL: OnceLock<Profiler> = OnceLock::new();

impl Profiler {
    /// Create an idle profiler
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an idle profiler that reports every session end to `hook`
    ///
    /// The hook runs on whichever thread ended the session, including the
    /// timeout watcher, after the trace has been written.
    pub fn with_end_hook<F>(hook: F) -> Self
    where
        F: Fn(EndReason, &Result<TraceSummary>) + Send + Sync + 'static,
    {
        Self::build(Some(Arc::new(hook)))
    }

    fn build(end_hook: Option<EndHook>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Idle),
                ended: Condvar::new(),
                verbosity: AtomicUsize::new(UNLIMITED_VERBOSITY),
                end_hook,
            }),
        }
    }

    /// Process-wide profiler for applications that want a single session
    pub fn global() -> &'static Profiler {
        GLOBAL.get_or_init(Profiler::new)
    }

    /// Begin a session
    ///
    /// Allocates the event buffer, resolves the output path and, when a
    /// positive timeout is configured, arms the timeout watcher.
    pub fn begin_session(&self, config: SessionConfig) -> Result<SessionInfo> {
        config.validate()?;

        loop {
            let mut state = self.shared.state.lock();
            let previous = match &*state {
                SessionState::Idle => return self.start_locked(&mut state, &config),
                SessionState::Ending => return Err(ProfilerError::SessionEnding),
                SessionState::Running(active) if config.on_active == ActivePolicy::Reject => {
                    return Err(ProfilerError::SessionAlreadyRunning {
                        path: active.output_path.clone(),
                    });
                }
                SessionState::Running(_) => state.take_running(),
            };
            drop(state);

            if let Some(previous) = previous {
                // The replaced session's outcome goes to the log and hook.
                let _ = self.shared.finish(previous, EndReason::Restarted);
            }
        }
    }

    fn start_locked(&self, state: &mut SessionState, config: &SessionConfig) -> Result<SessionInfo> {
        let started_at = Local::now();
        let session_id = Uuid::new_v4();
        let output_path = config.resolve_output_path(started_at);
        let timeout = config.timeout_duration();

        let watcher = match timeout {
            Some(timeout) => {
                let shared = Arc::downgrade(&self.shared);
                Some(TimeoutWatcher::spawn(timeout, move || {
                    Shared::expire(&shared, session_id)
                })?)
            }
            None => None,
        };

        let active = ActiveSession::new(
            session_id,
            output_path,
            config.capacity(),
            started_at,
            watcher,
        );
        let info = active.info();
        *state = SessionState::Running(active);

        tracing::info!(
            session_id = %session_id,
            path = %info.output_path.display(),
            capacity = info.capacity,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "profiling session started"
        );

        Ok(info)
    }

    /// End the running session and write its trace
    ///
    /// Blocks until the timeout watcher has stopped and the file is written.
    /// Returns `Ok(None)` when no session is running. When another thread is
    /// already ending the session (overflow, timeout or a concurrent
    /// `end_session`), waits for that write to finish and returns `Ok(None)`.
    pub fn end_session(&self) -> Result<Option<TraceSummary>> {
        let active = {
            let mut state = self.shared.state.lock();
            let active = state.take_running();
            if active.is_none() {
                while state.is_ending() {
                    self.shared.ended.wait(&mut state);
                }
            }
            active
        };
        match active {
            Some(active) => self.shared.finish(active, EndReason::Manual).map(Some),
            None => Ok(None),
        }
    }

    /// Whether a session is currently running
    pub fn has_session(&self) -> bool {
        self.shared.state.lock().is_running()
    }

    /// Snapshot of the running session
    pub fn session_info(&self) -> Option<SessionInfo> {
        match &*self.shared.state.lock() {
            SessionState::Running(active) => Some(active.info()),
            _ => None,
        }
    }

    /// Set the verbosity ceiling; `0` records everything
    pub fn set_verbosity(&self, verbosity: usize) {
        self.shared.verbosity.store(verbosity, Ordering::Relaxed);
    }

    /// Current verbosity ceiling
    pub fn verbosity(&self) -> usize {
        self.shared.verbosity.load(Ordering::Relaxed)
    }

    /// Whether an event of `verbosity` passes the current gate
    #[inline]
    pub fn is_valid_verbosity(&self, verbosity: usize) -> bool {
        let ceiling = self.verbosity();
        ceiling == UNLIMITED_VERBOSITY || verbosity <= ceiling
    }

    /// Start measuring a scope at verbosity 0
    #[inline]
    pub fn record(&self, name: &'static str, category: &'static str) -> Recorder<'_, 0> {
        Recorder::new(self, name, category)
    }

    /// Start measuring a scope at a compile-time verbosity
    #[inline]
    pub fn record_with_verbosity<const VERBOSITY: usize>(
        &self,
        name: &'static str,
        category: &'static str,
    ) -> Recorder<'_, VERBOSITY> {
        Recorder::new(self, name, category)
    }

    /// Report one measured interval
    ///
    /// The verbosity gate is checked first, at report time; a filtered event
    /// is discarded even with no running session. If the event fills the
    /// buffer, the session is written and ended on the calling thread.
    pub fn report_event(
        &self,
        verbosity: usize,
        name: &'static str,
        category: &'static str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Report> {
        if !self.is_valid_verbosity(verbosity) {
            return Ok(Report::Filtered);
        }

        let event = Event::new(name, category, start, end);

        let full = {
            let mut state = self.shared.state.lock();
            let SessionState::Running(active) = &mut *state else {
                return Err(ProfilerError::NoActiveSession);
            };

            if !active.record(event, name, category) {
                return Ok(Report::Recorded);
            }
            state.take_running()
        };

        match full {
            Some(active) => self
                .shared
                .finish(active, EndReason::BufferFull)
                .map(Report::SessionEnded),
            None => Ok(Report::Recorded),
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("session", &self.session_info())
            .field("verbosity", &self.verbosity())
            .field("end_hook", &self.shared.end_hook.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Shared {
    /// Timeout path; runs on the watcher thread
    fn expire(shared: &Weak<Shared>, session_id: Uuid) {
        let Some(shared) = shared.upgrade() else {
            return;
        };

        let expired = {
            let mut state = shared.state.lock();
            match &*state {
                SessionState::Running(active) if active.session_id == session_id => {
                    state.take_running()
                }
                _ => None,
            }
        };

        if let Some(active) = expired {
            // No caller to hand the result to; finish() logs and calls the hook.
            let _ = shared.finish(active, EndReason::Timeout);
        }
    }

    /// Terminal path shared by every way a session can end
    ///
    /// The state must already be `Ending`.
    fn finish(&self, active: ActiveSession, reason: EndReason) -> Result<TraceSummary> {
        let ActiveSession {
            session_id,
            output_path,
            buffer,
            names,
            categories,
            watcher,
            ..
        } = active;

        // Wakes the watcher and joins it, unless this is the watcher thread.
        drop(watcher);

        let result = TraceSerializer::new(&buffer, &names, &categories)
            .write_to_path(&output_path)
            .map(|()| TraceSummary {
                session_id,
                path: output_path.clone(),
                event_count: buffer.len(),
                reason,
                collisions: names.collisions() + categories.collisions(),
            });

        self.state.lock().finish_ending();
        self.ended.notify_all();

        match &result {
            Ok(summary) => tracing::info!(
                session_id = %session_id,
                reason = %reason,
                events = summary.event_count,
                path = %summary.path.display(),
                "profiling session ended"
            ),
            Err(e) => tracing::error!(
                session_id = %session_id,
                reason = %reason,
                error = %e,
                "profiling session ended without a trace"
            ),
        }

        if let Some(hook) = &self.end_hook {
            hook(reason, &result);
        }

        result
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(active) = self.state.get_mut().take_running() {
            let _ = self.finish(active, EndReason::Dropped);
        }
    }
}
