//! Scope-bound measurement
//!
//! A [`Recorder`] captures a start timestamp when it is created and reports
//! the elapsed interval to its [`Profiler`] when it goes out of scope, on every
//! exit path including early returns and unwinding.
//!
//! The verbosity is a const generic bound at the call site. Building without
//! the `enabled` feature turns every recorder into an inert value that takes
//! no timestamp and whose drop does nothing.
//!
//! ```rust,no_run
//! use scopetrace_core::Profiler;
//!
//! fn step(profiler: &Profiler) {
//!     let _scope = profiler.record(concat!("step", " (physics)"), "sim");
//!     let _detail = profiler.record_with_verbosity::<2>("step::broadphase", "sim");
//!     // measured work
//! }
//! ```

use crate::error::Result;
use crate::session::{Profiler, Report};

#[cfg(feature = "enabled")]
use crate::timing::Timestamp;

/// Measures the scope it lives in
#[cfg(feature = "enabled")]
#[must_use = "a recorder measures until it is dropped; binding it to `_` drops it immediately"]
pub struct Recorder<'p, const VERBOSITY: usize = 0> {
    profiler: &'p Profiler,
    name: &'static str,
    category: &'static str,
    /// `None` once the measurement has been reported
    start: Option<Timestamp>,
}

#[cfg(feature = "enabled")]
impl<'p, const VERBOSITY: usize> Recorder<'p, VERBOSITY> {
    /// Start measuring now
    #[inline]
    pub fn new(profiler: &'p Profiler, name: &'static str, category: &'static str) -> Self {
        Self {
            profiler,
            name,
            category,
            start: Some(Timestamp::now()),
        }
    }

    /// Verbosity this recorder reports with
    pub const fn verbosity(&self) -> usize {
        VERBOSITY
    }

    /// Scope name written to the trace
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Category written to the trace
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Stop measuring now and return what happened to the event
    pub fn stop(mut self) -> Result<Report> {
        self.report().unwrap_or(Ok(Report::Filtered))
    }

    fn report(&mut self) -> Option<Result<Report>> {
        let start = self.start.take()?;
        let end = Timestamp::now();
        Some(
            self.profiler
                .report_event(VERBOSITY, self.name, self.category, start, end),
        )
    }
}

#[cfg(feature = "enabled")]
impl<const VERBOSITY: usize> Drop for Recorder<'_, VERBOSITY> {
    fn drop(&mut self) {
        if let Some(Err(e)) = self.report() {
            tracing::warn!(
                scope = self.name,
                category = self.category,
                error = %e,
                "scope measurement dropped"
            );
        }
    }
}

/// Measures nothing; instrumentation is compiled out
#[cfg(not(feature = "enabled"))]
#[must_use]
pub struct Recorder<'p, const VERBOSITY: usize = 0> {
    _profiler: std::marker::PhantomData<&'p Profiler>,
    name: &'static str,
    category: &'static str,
}

#[cfg(not(feature = "enabled"))]
impl<'p, const VERBOSITY: usize> Recorder<'p, VERBOSITY> {
    #[inline(always)]
    pub fn new(_profiler: &'p Profiler, name: &'static str, category: &'static str) -> Self {
        Self {
            _profiler: std::marker::PhantomData,
            name,
            category,
        }
    }

    pub const fn verbosity(&self) -> usize {
        VERBOSITY
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    #[inline(always)]
    pub fn stop(self) -> Result<Report> {
        Ok(Report::Filtered)
    }
}
