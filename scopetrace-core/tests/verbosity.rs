//! Verbosity gate behavior as seen in written traces

#![cfg(feature = "enabled")]

mod common;

use scopetrace_core::{Profiler, Report, UNLIMITED_VERBOSITY};

#[test]
fn test_ceiling_filters_verbose_scopes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gate.json");
    let profiler = Profiler::new();
    profiler.set_verbosity(2);
    profiler.begin_session(common::config(&dir, "gate.json", 16)).unwrap();

    {
        let _v0 = profiler.record("v0", "gate");
        let _v1 = profiler.record_with_verbosity::<1>("v1", "gate");
        let _v2 = profiler.record_with_verbosity::<2>("v2", "gate");
        let _v3 = profiler.record_with_verbosity::<3>("v3", "gate");
    }
    profiler.end_session().unwrap();

    // Locals drop in reverse declaration order
    assert_eq!(common::event_names(&path), vec!["v2", "v1", "v0"]);
}

#[test]
fn test_unlimited_records_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.json");
    let profiler = Profiler::new();
    profiler.set_verbosity(UNLIMITED_VERBOSITY);
    profiler.begin_session(common::config(&dir, "all.json", 16)).unwrap();

    {
        let _deep = profiler.record_with_verbosity::<9>("deep", "gate");
    }
    profiler.end_session().unwrap();

    assert_eq!(common::event_names(&path), vec!["deep"]);
}

#[test]
fn test_gate_is_evaluated_at_scope_exit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exit.json");
    let profiler = Profiler::new();
    profiler.begin_session(common::config(&dir, "exit.json", 16)).unwrap();

    // Opened while filtered, closed after the ceiling was raised
    profiler.set_verbosity(1);
    let raised = profiler.record_with_verbosity::<3>("raised", "gate");
    profiler.set_verbosity(3);
    assert_eq!(raised.stop().unwrap(), Report::Recorded);

    // Opened while allowed, closed after the ceiling was lowered
    let lowered = profiler.record_with_verbosity::<3>("lowered", "gate");
    profiler.set_verbosity(1);
    assert_eq!(lowered.stop().unwrap(), Report::Filtered);

    profiler.end_session().unwrap();
    assert_eq!(common::event_names(&path), vec!["raised"]);
}

#[test]
fn test_filtered_scopes_do_not_consume_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let profiler = Profiler::new();
    profiler.set_verbosity(1);
    profiler.begin_session(common::config(&dir, "capacity.json", 2)).unwrap();

    for _ in 0..10 {
        let _noisy = profiler.record_with_verbosity::<5>("noisy", "gate");
    }

    assert!(profiler.has_session());
    assert_eq!(profiler.session_info().unwrap().recorded, 0);
}
