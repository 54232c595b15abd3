//! String interning for scope names and categories
//!
//! Each distinct string is stored once per session, keyed by its hash.
//! Entries are never removed or replaced while the session lives. Two
//! different strings with the same hash are a collision: the first string
//! wins, the collision is counted and logged, and both scopes are written
//! under the first name.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Hash used to key interned text
#[inline]
pub fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Result of inserting into the interner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interned {
    /// First time this hash was seen
    New,
    /// Same text already stored
    Existing,
    /// Different text already stored under this hash
    Collision,
}

/// Insertion-only hash → text table
#[derive(Debug, Default)]
pub struct StringInterner {
    entries: HashMap<u64, &'static str>,
    collisions: usize,
}

impl StringInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash and store `text`, returning its key
    pub fn intern(&mut self, text: &'static str) -> u64 {
        let hash = hash_text(text);
        self.insert(hash, text);
        hash
    }

    /// Store `text` under a precomputed hash
    pub fn insert(&mut self, hash: u64, text: &'static str) -> Interned {
        match self.entries.entry(hash) {
            Entry::Vacant(slot) => {
                slot.insert(text);
                Interned::New
            }
            Entry::Occupied(slot) => {
                let stored = *slot.get();
                if std::ptr::eq(stored, text) || stored == text {
                    Interned::Existing
                } else {
                    self.collisions += 1;
                    tracing::warn!(
                        hash,
                        kept = stored,
                        dropped = text,
                        "interned string hash collision"
                    );
                    Interned::Collision
                }
            }
        }
    }

    /// Text stored under `hash`
    pub fn resolve(&self, hash: u64) -> Option<&'static str> {
        self.entries.get(&hash).copied()
    }

    /// Number of distinct stored strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of collisions detected so far
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
