//! Recording from many threads into one session

#![cfg(feature = "enabled")]

mod common;

use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::{Duration, Instant};

use scopetrace_core::{EndReason, Profiler, ProfilerError, Report, SessionConfig};

const WORKERS: [&str; 4] = ["worker_a", "worker_b", "worker_c", "worker_d"];

#[test]
fn test_all_threads_events_are_written() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("threads.json");
    let profiler = Profiler::new();
    profiler.begin_session(common::config(&dir, "threads.json", 4096)).unwrap();

    let handles: Vec<_> = WORKERS
        .iter()
        .map(|&name| {
            let profiler = profiler.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    let _scope = profiler.record(name, "pool");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let summary = profiler.end_session().unwrap().unwrap();
    assert_eq!(summary.event_count, 1000);
    assert_eq!(summary.collisions, 0);

    let events = common::read_events(&path);
    let mut per_name: HashMap<String, usize> = HashMap::new();
    let mut tids_by_name: HashMap<String, HashSet<u64>> = HashMap::new();
    for event in &events {
        let name = event["name"].as_str().unwrap().to_string();
        *per_name.entry(name.clone()).or_default() += 1;
        tids_by_name
            .entry(name)
            .or_default()
            .insert(event["tid"].as_u64().unwrap());
        assert_eq!(event["cat"], "pool");
    }

    for name in WORKERS {
        assert_eq!(per_name[name], 250, "{name}");
        // Each worker ran on one thread
        assert_eq!(tids_by_name[name].len(), 1, "{name}");
    }

    let distinct: HashSet<u64> = tids_by_name.values().flatten().copied().collect();
    assert_eq!(distinct.len(), WORKERS.len());
}

#[test]
fn test_concurrent_overflow_ends_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.json");
    let profiler = Profiler::new();
    profiler.begin_session(common::config(&dir, "race.json", 100)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let profiler = profiler.clone();
            thread::spawn(move || {
                let mut recorded = 0usize;
                let mut ended = Vec::new();
                for _ in 0..50 {
                    match profiler.record("contended", "race").stop() {
                        Ok(Report::Recorded) => recorded += 1,
                        Ok(Report::SessionEnded(summary)) => ended.push(summary),
                        Ok(Report::Filtered) => panic!("nothing is filtered"),
                        Err(ProfilerError::NoActiveSession) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                (recorded, ended)
            })
        })
        .collect();

    let mut recorded = 0;
    let mut ended = Vec::new();
    for handle in handles {
        let (r, e) = handle.join().unwrap();
        recorded += r;
        ended.extend(e);
    }

    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].reason, EndReason::BufferFull);
    assert_eq!(ended[0].event_count, 100);
    assert_eq!(recorded, 99);
    assert!(!profiler.has_session());
    assert_eq!(common::read_events(&path).len(), 100);
}

#[test]
fn test_concurrent_end_session_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let profiler = Profiler::new();
    profiler.begin_session(common::config(&dir, "ends.json", 16)).unwrap();
    {
        let _scope = profiler.record("single", "race");
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let profiler = profiler.clone();
            thread::spawn(move || profiler.end_session().unwrap())
        })
        .collect();

    let written: Vec<_> = handles
        .into_iter()
        .filter_map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0].event_count, 1);
}

#[test]
fn test_begin_race_allows_one_session() {
    let dir = tempfile::tempdir().unwrap();
    let profiler = Profiler::new();

    let handles: Vec<_> = ["r0.json", "r1.json", "r2.json", "r3.json"]
        .into_iter()
        .map(|file| {
            let profiler = profiler.clone();
            let config = common::config(&dir, file, 8);
            thread::spawn(move || profiler.begin_session(config).is_ok())
        })
        .collect();

    let started = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(started, 1);
    assert!(profiler.has_session());
}

#[cfg(unix)]
#[test]
fn test_end_session_waits_for_inflight_write() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("blocked.json");
    let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
    assert!(status.success());

    let profiler = Profiler::new();
    profiler
        .begin_session(SessionConfig::with_capacity(1, &fifo).append_date(false))
        .unwrap();

    // Filling the buffer starts the write, which blocks until the pipe has a reader
    let writer = {
        let profiler = profiler.clone();
        thread::spawn(move || profiler.record("fills", "pipe").stop())
    };
    while profiler.has_session() {
        thread::sleep(Duration::from_millis(1));
    }

    let reader = {
        let fifo = fifo.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            std::fs::read_to_string(fifo).unwrap()
        })
    };

    let started = Instant::now();
    assert_eq!(profiler.end_session().unwrap(), None);
    assert!(
        started.elapsed() >= Duration::from_millis(50),
        "end_session returned before the trace was written"
    );

    // The write has finished, so a new session can start immediately
    profiler.begin_session(common::config(&dir, "next.json", 4)).unwrap();
    assert!(profiler.has_session());

    assert!(reader.join().unwrap().contains("\"name\":\"fills\""));
    assert!(matches!(writer.join().unwrap(), Ok(Report::SessionEnded(_))));
}
