//! Trace recording pipeline
//!
//! Recorded scopes become fixed-size [`Event`]s appended to a preallocated
//! [`EventBuffer`]. Names and categories are stored once per session in a
//! [`StringInterner`] and referenced from events by hash. At session end the
//! [`TraceSerializer`] renders everything as Chrome trace JSON.
//!
//! ## Output format
//!
//! ```text
//! {"traceEvents":[
//!  {"pid":0,"ph":"X","tid":<u64>,"ts":<u32>,"dur":<u32>,"cat":"<text>","name":"<text>"},
//!  ...
//! ]}
//! ```
//!
//! The file loads directly in `chrome://tracing` or <https://ui.perfetto.dev>.
//! Viewers order events by `ts`/`dur`, not by array position.

mod buffer;
mod event;
mod interner;
mod serializer;

pub use buffer::EventBuffer;
pub use event::{current_thread_hash, Event, EVENT_SIZE};
pub use interner::{hash_text, Interned, StringInterner};
pub use serializer::TraceSerializer;

/// Process id written into every event
pub const TRACE_PID: u32 = 0;

/// Phase of a complete (duration) event
pub const COMPLETE_PHASE: &str = "X";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::Timestamp;
    use std::time::Duration;

    #[test]
    fn test_buffer_interner_serializer_pipeline() {
        let mut buffer = EventBuffer::new(2);
        let mut names = StringInterner::new();
        let mut categories = StringInterner::new();

        let start = Timestamp::now();
        for name in ["load", "parse"] {
            let event = Event::new(name, "io", start, start + Duration::from_micros(10));
            names.insert(event.name_hash, name);
            categories.insert(event.category_hash, "io");
            buffer.push(event).unwrap();
        }

        assert!(buffer.is_full());
        assert_eq!(categories.len(), 1);

        let json = TraceSerializer::new(&buffer, &names, &categories)
            .to_json_string()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let events = parsed["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["name"], "load");
        assert_eq!(events[1]["name"], "parse");
        assert_eq!(events[1]["cat"], "io");
    }
}
