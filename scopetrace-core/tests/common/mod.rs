//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use scopetrace_core::SessionConfig;
use serde_json::Value;

/// Route library logs to the test harness output
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scopetrace_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Undated config writing `file_name` inside `dir`
pub fn config(dir: &tempfile::TempDir, file_name: &str, events: usize) -> SessionConfig {
    SessionConfig::with_capacity(events, dir.path().join(file_name)).append_date(false)
}

/// Parse a trace file and return its events
pub fn read_events(path: &Path) -> Vec<Value> {
    let contents = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("trace {} unreadable: {e}", path.display()));
    let trace: Value = serde_json::from_str(&contents).expect("trace is not valid JSON");
    trace["traceEvents"]
        .as_array()
        .expect("traceEvents is not an array")
        .clone()
}

/// Names of the events in a trace, in file order
pub fn event_names(path: &Path) -> Vec<String> {
    read_events(path)
        .iter()
        .map(|e| e["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// All files in `dir`
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}
