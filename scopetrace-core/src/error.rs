//! Error types for profiling sessions
//!
//! Errors fall into a small number of classes:
//! - **State** errors: the session state machine was driven out of order
//!   (reporting with no session, beginning while one is running)
//! - **Validation** errors: a `SessionConfig` cannot produce a usable session
//! - **I/O** errors: the trace file could not be written, which loses every
//!   event recorded in the session
//!
//! Each variant carries a stable error code (e.g. `NO_ACTIVE_SESSION`) so
//! callers can switch on it without matching message text.
//!
//! # Example
//!
//! ```rust
//! use scopetrace_core::error::{ErrorCategory, ProfilerError};
//!
//! fn handle(err: ProfilerError) {
//!     match err.category() {
//!         ErrorCategory::State => println!("session used out of order"),
//!         ErrorCategory::Io => println!("trace lost: {err}"),
//!         _ => println!("other error"),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for profiler operations
pub type Result<T> = std::result::Result<T, ProfilerError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Session state machine used out of order
    State,
    /// Invalid configuration
    Validation,
    /// File system or thread spawning failure
    Io,
    /// Serialization failure
    Internal,
}

/// Errors that can occur while profiling
#[derive(Error, Debug)]
pub enum ProfilerError {
    // ═══════════════════════════════════════════════════════════════════════
    // Session state errors
    // ═══════════════════════════════════════════════════════════════════════

    /// `begin_session` was called while a session is running
    #[error("A profiling session is already running (writing to '{path}'). End it first or use ActivePolicy::Restart.")]
    SessionAlreadyRunning { path: PathBuf },

    /// `begin_session` was called while the previous session is still being written
    #[error("The previous profiling session is still writing its trace. Retry once it has finished.")]
    SessionEnding,

    /// An event was reported with no running session
    #[error("No profiling session is running. Call begin_session() before recording.")]
    NoActiveSession,

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Session configuration is unusable
    #[error("Invalid session config: {reason}")]
    InvalidConfig { reason: String },

    /// Buffer cannot hold a single event
    #[error("Buffer of {bytes} bytes cannot hold a single {event_size}-byte event")]
    BufferTooSmall { bytes: usize, event_size: usize },

    // ═══════════════════════════════════════════════════════════════════════
    // Infrastructure errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Writing the trace file failed
    #[error("Failed to write trace to '{path}': {source}")]
    TraceWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The timeout watcher thread could not be started
    #[error("Failed to spawn timeout watcher: {0}")]
    WatcherSpawn(#[source] io::Error),

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProfilerError {
    /// Returns true if retrying the same call later might succeed
    ///
    /// Only `SessionEnding` qualifies: the blocking session will become idle
    /// once its trace is on disk.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProfilerError::SessionEnding)
    }

    /// Returns true if recorded data was lost
    pub fn is_data_loss(&self) -> bool {
        matches!(self, ProfilerError::TraceWrite { .. })
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProfilerError::SessionAlreadyRunning { .. }
            | ProfilerError::SessionEnding
            | ProfilerError::NoActiveSession => ErrorCategory::State,

            ProfilerError::InvalidConfig { .. }
            | ProfilerError::BufferTooSmall { .. } => ErrorCategory::Validation,

            ProfilerError::TraceWrite { .. }
            | ProfilerError::WatcherSpawn(_) => ErrorCategory::Io,

            ProfilerError::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ProfilerError::SessionAlreadyRunning { .. } => "SESSION_ALREADY_RUNNING",
            ProfilerError::SessionEnding => "SESSION_ENDING",
            ProfilerError::NoActiveSession => "NO_ACTIVE_SESSION",
            ProfilerError::InvalidConfig { .. } => "INVALID_CONFIG",
            ProfilerError::BufferTooSmall { .. } => "BUFFER_TOO_SMALL",
            ProfilerError::TraceWrite { .. } => "TRACE_WRITE_FAILED",
            ProfilerError::WatcherSpawn(_) => "WATCHER_SPAWN_FAILED",
            ProfilerError::Json(_) => "JSON_ERROR",
        }
    }

    /// Converts this error to a JSON-serializable report
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                recoverable: self.is_recoverable(),
            },
        }
    }
}

/// JSON-serializable error report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "NO_ACTIVE_SESSION")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category
    pub category: ErrorCategory,
    /// Whether retry might succeed
    pub recoverable: bool,
}
