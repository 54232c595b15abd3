//! Fixed-capacity event buffer
//!
//! The buffer is allocated once when a session begins and never grows.
//! Reaching capacity is the overflow trigger that ends the session.

use super::event::Event;

/// Preallocated, append-only sequence of events
///
/// Insertion order is recording order. Under concurrency that is not the
/// same as timestamp order.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Event>,
    capacity: usize,
}

impl EventBuffer {
    /// Allocate a buffer for exactly `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event
    ///
    /// Returns `Ok(true)` when this event filled the buffer, and hands the
    /// event back if the buffer was already full.
    pub fn push(&mut self, event: Event) -> Result<bool, Event> {
        if self.is_full() {
            return Err(event);
        }
        self.events.push(event);
        Ok(self.is_full())
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are stored
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of events
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer has reached capacity
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    /// Remaining room
    pub fn remaining(&self) -> usize {
        self.capacity - self.events.len()
    }

    /// Stored events in recording order
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Iterate stored events in recording order
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventBuffer {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
