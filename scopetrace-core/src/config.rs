//! Configuration for profiling sessions

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, Result};
use crate::trace::EVENT_SIZE;

/// Format of the suffix appended to the output file stem
pub const DATE_SUFFIX_FORMAT: &str = "_%Y.%m.%d_%H-%M-%S";

/// What `begin_session` does when a session is already running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivePolicy {
    /// Fail with `SessionAlreadyRunning`
    #[default]
    Reject,
    /// End the running session (writing its trace), then begin
    Restart,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bytes reserved for buffered events
    pub buffer_size_bytes: usize,

    /// Trace file destination
    pub output_path: PathBuf,

    /// Whether to suffix the file stem with the local start time
    #[serde(default = "default_true")]
    pub append_date: bool,

    /// Automatic session end in milliseconds; absent or zero disables it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Behaviour when a session is already running
    #[serde(default)]
    pub on_active: ActivePolicy,
}

fn default_true() -> bool {
    true
}

impl SessionConfig {
    /// Configuration with a date-suffixed path and no timeout
    pub fn new(buffer_size_bytes: usize, output_path: impl Into<PathBuf>) -> Self {
        Self {
            buffer_size_bytes,
            output_path: output_path.into(),
            append_date: true,
            timeout_ms: None,
            on_active: ActivePolicy::Reject,
        }
    }

    /// Configuration sized for exactly `events` events
    pub fn with_capacity(events: usize, output_path: impl Into<PathBuf>) -> Self {
        Self::new(events.saturating_mul(EVENT_SIZE), output_path)
    }

    pub fn append_date(mut self, append: bool) -> Self {
        self.append_date = append;
        self
    }

    /// End the session automatically once `timeout` has elapsed
    ///
    /// Rounded up to whole milliseconds, so any positive timeout stays armed.
    /// `Duration::ZERO` disables the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(millis.min(u64::MAX as u128) as u64);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout_ms = None;
        self
    }

    pub fn on_active(mut self, policy: ActivePolicy) -> Self {
        self.on_active = policy;
        self
    }

    /// Number of events the buffer holds
    pub fn capacity(&self) -> usize {
        self.buffer_size_bytes / EVENT_SIZE
    }

    /// Effective timeout, if one is armed
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Check that the configuration can produce a session
    pub fn validate(&self) -> Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(ProfilerError::InvalidConfig {
                reason: "output_path is empty".to_string(),
            });
        }

        if self.output_path.file_name().is_none() {
            return Err(ProfilerError::InvalidConfig {
                reason: format!("output_path '{}' has no file name", self.output_path.display()),
            });
        }

        if self.capacity() == 0 {
            return Err(ProfilerError::BufferTooSmall {
                bytes: self.buffer_size_bytes,
                event_size: EVENT_SIZE,
            });
        }

        Ok(())
    }

    /// Final output path for a session started at `started_at`
    pub fn resolve_output_path(&self, started_at: DateTime<Local>) -> PathBuf {
        if self.append_date {
            append_timestamp(&self.output_path, started_at)
        } else {
            self.output_path.clone()
        }
    }
}

/// Insert `_YYYY.MM.DD_HH-MM-SS` between the file stem and its extension
pub fn append_timestamp(path: &Path, at: DateTime<Local>) -> PathBuf {
    let suffix = at.format(DATE_SUFFIX_FORMAT).to_string();

    let mut file_name = path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(suffix);
    if let Some(extension) = path.extension() {
        file_name.push(".");
        file_name.push(extension);
    }

    path.with_file_name(file_name)
}
