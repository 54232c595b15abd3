//! Chrome trace JSON serializer
//!
//! Writes `{"traceEvents":[...]}` with one complete event per buffered
//! measurement. The whole file is built in a single pass, with no trailing
//! comma and no trailing newline.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{ProfilerError, Result};

use super::buffer::EventBuffer;
use super::event::Event;
use super::interner::StringInterner;
use super::{COMPLETE_PHASE, TRACE_PID};

/// Wire shape of one complete event; field order is the file's key order
#[derive(Serialize)]
struct CompleteEvent<'a> {
    pid: u32,
    ph: &'static str,
    tid: u64,
    ts: u32,
    dur: u32,
    cat: &'a str,
    name: &'a str,
}

/// Renders a session's buffer and interned strings as trace JSON
pub struct TraceSerializer<'a> {
    events: &'a EventBuffer,
    names: &'a StringInterner,
    categories: &'a StringInterner,
}

impl<'a> TraceSerializer<'a> {
    /// Borrow the session data to serialize
    pub fn new(
        events: &'a EventBuffer,
        names: &'a StringInterner,
        categories: &'a StringInterner,
    ) -> Self {
        Self {
            events,
            names,
            categories,
        }
    }

    fn complete_event(&self, event: &Event) -> CompleteEvent<'a> {
        CompleteEvent {
            pid: TRACE_PID,
            ph: COMPLETE_PHASE,
            tid: event.thread_hash,
            ts: event.start_us,
            dur: event.duration_us,
            cat: self.categories.resolve(event.category_hash).unwrap_or_default(),
            name: self.names.resolve(event.name_hash).unwrap_or_default(),
        }
    }

    /// Write the trace to any writer
    ///
    /// Names and categories go through `serde_json`, so quotes, backslashes
    /// and control characters are escaped.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(b"{\"traceEvents\":[")?;

        for (index, event) in self.events.iter().enumerate() {
            if index > 0 {
                writer.write_all(b",")?;
            }
            serde_json::to_writer(&mut writer, &self.complete_event(event))?;
        }

        writer.write_all(b"]}")?;
        writer.flush()
    }

    /// Write the trace to `path`, creating parent directories as needed
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let trace_write = |source: io::Error| ProfilerError::TraceWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(trace_write)?;
        }

        let file = File::create(path).map_err(trace_write)?;
        self.write(BufWriter::new(file)).map_err(trace_write)
    }

    /// Render the trace into a string
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = Vec::with_capacity(self.events.len() * 96 + 18);
        self.write(&mut out).map_err(serde_json::Error::io)?;
        String::from_utf8(out)
            .map_err(|e| ProfilerError::Json(<serde_json::Error as serde::ser::Error>::custom(e)))
    }
}
