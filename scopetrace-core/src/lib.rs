//! # Scopetrace Core
//!
//! In-process wall-clock instrumentation. Code regions ("scopes") are
//! measured with RAII recorders and written as a Chrome trace file that
//! opens in `chrome://tracing` or Perfetto.
//!
//! - **Session**: one bounded recording run, from `begin_session` until a
//!   manual end, a full buffer or a timeout, producing one trace file
//! - **Recorder**: scope-bound measurement that reports on drop
//! - **Verbosity gate**: events above the current ceiling are discarded at
//!   scope exit
//!
//! Only raw intervals are recorded; the trace viewer does the analysis.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scopetrace_core::{Profiler, SessionConfig};
//!
//! let profiler = Profiler::global();
//! profiler.begin_session(
//!     SessionConfig::new(4 * 1024 * 1024, "profile/trace.json")
//!         .timeout(Duration::from_secs(10)),
//! )?;
//!
//! {
//!     let _frame = profiler.record("frame", "render");
//!     let _upload = profiler.record_with_verbosity::<2>("upload_textures", "render");
//!     // measured work
//! }
//!
//! if let Some(summary) = profiler.end_session()? {
//!     println!("{} events written to {}", summary.event_count, summary.path.display());
//! }
//! # Ok::<(), scopetrace_core::ProfilerError>(())
//! ```
//!
//! ## Cargo features
//!
//! - `enabled` (default): recorders measure. Without it they compile to
//!   nothing.

pub mod config;
pub mod error;
pub mod recorder;
pub mod session;
pub mod timing;
pub mod trace;

pub use config::{ActivePolicy, SessionConfig};
pub use error::{ProfilerError, Result};
pub use recorder::Recorder;
pub use session::{EndReason, Profiler, Report, SessionInfo, TraceSummary, UNLIMITED_VERBOSITY};
pub use timing::Timestamp;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
