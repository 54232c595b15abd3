//! Session timeout watcher
//!
//! A single background thread that waits for either the configured timeout or
//! an explicit wake signal, whichever comes first. Only the timeout outcome
//! runs the expiry callback.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::error::{ProfilerError, Result};

/// Cancellable one-shot timer backed by a dedicated thread
///
/// Dropping the watcher (or calling [`TimeoutWatcher::cancel`]) wakes the
/// thread and waits for it to exit. When the drop happens on the watcher's
/// own thread (the expiry callback ended the session) the join is skipped.
pub struct TimeoutWatcher {
    /// Wake signal; a send or a disconnect both count as cancellation
    wake: Option<Sender<()>>,
    /// Watcher thread handle
    handle: Option<JoinHandle<()>>,
    /// Configured timeout
    timeout: Duration,
}

impl TimeoutWatcher {
    /// Arm a watcher that calls `on_expire` once `timeout` elapses
    pub fn spawn<F>(timeout: Duration, on_expire: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let (wake, signal) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("scopetrace-timeout".to_string())
            .spawn(move || match signal.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => on_expire(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            })
            .map_err(ProfilerError::WatcherSpawn)?;

        Ok(Self {
            wake: Some(wake),
            handle: Some(handle),
            timeout,
        })
    }

    /// The configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the watcher thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wake the watcher and wait until its thread has stopped
    pub fn cancel(self) {
        drop(self);
    }

    fn stop(&mut self) {
        if let Some(wake) = self.wake.take() {
            // Full means a wake is already pending.
            let _ = wake.try_send(());
        }

        let Some(handle) = self.handle.take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            tracing::warn!("timeout watcher panicked before it could be joined");
        }
    }
}

impl Drop for TimeoutWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TimeoutWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutWatcher")
            .field("timeout", &self.timeout)
            .field("finished", &self.is_finished())
            .finish()
    }
}
