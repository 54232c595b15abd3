//! Recorded event representation

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use crate::timing::Timestamp;

use super::interner::hash_text;

/// One completed measurement
///
/// Strings are referenced by hash so the event stays fixed-size and cheap to
/// copy into the buffer; the session's interners hold the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Hash of the interned scope name
    pub name_hash: u64,
    /// Hash of the interned category
    pub category_hash: u64,
    /// Hash of the recording thread's identity
    pub thread_hash: u64,
    /// Start time, microseconds since the process anchor (wrapping)
    pub start_us: u32,
    /// Elapsed microseconds between recorder creation and disposal
    pub duration_us: u32,
}

/// Size of one buffered event in bytes
pub const EVENT_SIZE: usize = std::mem::size_of::<Event>();

thread_local! {
    static THREAD_HASH: u64 = {
        let mut hasher = DefaultHasher::new();
        thread::current().id().hash(&mut hasher);
        hasher.finish()
    };
}

/// Hash of the calling thread's identity, computed once per thread
#[inline]
pub fn current_thread_hash() -> u64 {
    THREAD_HASH.with(|hash| *hash)
}

impl Event {
    /// Build an event for the calling thread
    pub fn new(name: &str, category: &str, start: Timestamp, end: Timestamp) -> Self {
        Self::on_thread(current_thread_hash(), name, category, start, end)
    }

    /// Build an event attributed to an explicit thread hash
    pub fn on_thread(
        thread_hash: u64,
        name: &str,
        category: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            name_hash: hash_text(name),
            category_hash: hash_text(category),
            thread_hash,
            start_us: start.as_trace_micros(),
            duration_us: start.micros_until(end),
        }
    }
}
