//! Scoped measurement guards.
//!
//! Both guards defer their side effect to scope exit: the exception guard
//! increments only when the guarded body fails, the execution timer records
//! only once measurement stops.

use prometheus::{Counter, Histogram};
use std::fmt;
use std::time::Instant;

/// Counts failures of a guarded body against a bound exception counter.
///
/// Returned by [`Monitor::count_exceptions`](crate::Monitor::count_exceptions).
/// The counter is touched only when the body returns `Err` or panics; the
/// failure itself always propagates to the caller.
pub struct ExceptionGuard {
    counter: Counter,
}

impl ExceptionGuard {
    pub(crate) fn new(counter: Counter) -> Self {
        Self { counter }
    }

    /// Run `body`, incrementing the exception counter by one if it fails.
    ///
    /// The result is returned unchanged; a panic unwinds through the guard
    /// after being counted.
    pub fn scope<T, E>(self, body: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let unwind = UnwindCounter(&self.counter);
        let result = body();
        std::mem::forget(unwind);

        if result.is_err() {
            self.counter.inc();
        }
        result
    }
}

impl fmt::Debug for ExceptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionGuard").finish_non_exhaustive()
    }
}

/// Increments on drop; forgotten on the non-panicking path.
struct UnwindCounter<'a>(&'a Counter);

impl Drop for UnwindCounter<'_> {
    fn drop(&mut self) {
        self.0.inc();
    }
}

/// Wall-clock timer recording into the raw and per-request duration
/// histograms under one label tuple.
///
/// Returned by
/// [`Monitor::time_model_execution`](crate::Monitor::time_model_execution).
/// Measurement starts at construction and is recorded exactly once, either
/// by [`stop`](Self::stop) or on drop. The per-request histogram receives
/// the raw duration divided by the number of parallel executions.
pub struct ExecutionTimer {
    raw: Histogram,
    per_request: Histogram,
    parallel_executions: f64,
    start: Instant,
    recorded: bool,
}

impl ExecutionTimer {
    pub(crate) fn new(raw: Histogram, per_request: Histogram, parallel_executions: u64) -> Self {
        Self {
            raw,
            per_request,
            parallel_executions: parallel_executions as f64,
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Stop the timer, record both observations, and return the measured
    /// duration in seconds.
    pub fn stop(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        if self.recorded {
            return 0.0;
        }
        self.recorded = true;

        let duration = self.start.elapsed().as_secs_f64();
        self.raw.observe(duration);
        self.per_request.observe(duration / self.parallel_executions);
        duration
    }
}

impl Drop for ExecutionTimer {
    fn drop(&mut self) {
        self.record();
    }
}

impl fmt::Debug for ExecutionTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionTimer")
            .field("parallel_executions", &self.parallel_executions)
            .field("start", &self.start)
            .field("recorded", &self.recorded)
            .finish_non_exhaustive()
    }
}
