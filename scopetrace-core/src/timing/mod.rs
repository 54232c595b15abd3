//! # Timing
//!
//! Monotonic timestamps and the session timeout watcher.
//!
//! ## Time base
//!
//! `Timestamp` wraps `std::time::Instant`. Trace timestamps are expressed as
//! microseconds since a process-wide anchor that is fixed the first time any
//! timestamp is taken, then truncated to 32 bits. A `u32` of microseconds wraps
//! after roughly 71 minutes, which is acceptable for the short-lived traces
//! this crate produces.
//!
//! ```text
//!  anchor            start                 end
//!    │─────────────────│─────────────────────│
//!    │◄── start_us ───►│◄──── duration_us ──►│
//! ```

mod watcher;

use std::ops::Add;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub use watcher::TimeoutWatcher;

/// Process-wide origin for trace timestamps
static ANCHOR: OnceLock<Instant> = OnceLock::new();

fn anchor() -> Instant {
    *ANCHOR.get_or_init(Instant::now)
}

/// A monotonic point in time captured by a recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Instant);

impl Timestamp {
    /// Capture the current monotonic time
    #[inline]
    pub fn now() -> Self {
        // The anchor must exist before the first sample so that no timestamp
        // precedes it.
        anchor();
        Self(Instant::now())
    }

    /// Microseconds since the process anchor, truncated to 32 bits
    #[inline]
    pub fn as_trace_micros(&self) -> u32 {
        self.0.saturating_duration_since(anchor()).as_micros() as u32
    }

    /// Whole microseconds from `self` to `later`
    ///
    /// Zero if `later` is earlier than `self`; saturates at `u32::MAX`.
    #[inline]
    pub fn micros_until(&self, later: Timestamp) -> u32 {
        let elapsed = later.0.saturating_duration_since(self.0).as_micros();
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }

    /// The underlying instant
    pub fn instant(&self) -> Instant {
        self.0
    }
}

impl From<Instant> for Timestamp {
    fn from(instant: Instant) -> Self {
        anchor();
        Self(instant)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0 + rhs)
    }
}
