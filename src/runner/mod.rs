//! # Run Control Module
//!
//! Cooperative run control shared by every engine in the crate.
//!
//! ## Design Invariants
//!
//! - Engines are single-threaded and advance in *checkpoint slices*: one
//!   call to the engine's internal `step` performs one checkpoint's worth
//!   of work and returns control.
//! - `run`, `run_for`, and `run_until` only observe deadlines and
//!   predicates *between* slices. Honouring latency is therefore bounded
//!   by one slice.
//! - A timed-out engine is left in a consistent, resumable state; calling
//!   a `run_*` method again continues from where it stopped.
//!
//! ## Answers Without Errors
//!
//! Queries that cannot yet be answered do not fail: tri-valued queries
//! return [`Tril::Unknown`] and cardinality queries return
//! [`Cardinality::Unknown`] (or [`Cardinality::Infinite`] when
//! obvious-infinity detection fires). These are answers, not errors.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

// ------------------------------------------------------------------------------------------------
// Tri-valued answers
// ------------------------------------------------------------------------------------------------

/// A three-valued answer for queries posed against a partially-run engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tril {
    /// Definitely true.
    True,

    /// Definitely false.
    False,

    /// Not decidable from the work done so far.
    Unknown,
}

impl Tril {
    /// Collapse a definite boolean into a `Tril`.
    pub fn from_bool(value: bool) -> Self {
        if value { Tril::True } else { Tril::False }
    }

    /// Returns true iff the answer is [`Tril::True`].
    pub fn is_true(self) -> bool {
        self == Tril::True
    }
}

/// The number of congruence classes (or elements) of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly `n` classes.
    Finite(u64),

    /// Provably infinitely many classes.
    Infinite,

    /// The engine has not (yet) determined the count.
    Unknown,
}

impl Cardinality {
    /// The finite count, if that is what this is.
    pub fn as_finite(self) -> Option<u64> {
        match self {
            Cardinality::Finite(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Finite(n) => write!(f, "{n}"),
            Cardinality::Infinite => write!(f, "+infinity"),
            Cardinality::Unknown => write!(f, "unknown"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Run state
// ------------------------------------------------------------------------------------------------

/// Lifecycle of a cooperative engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No `run_*` method has been called yet.
    #[default]
    NotStarted,

    /// A run is in progress (only observable from within `run_until`
    /// predicates).
    Running,

    /// The last run returned at a checkpoint because its deadline passed
    /// or its predicate fired; the engine is resumable.
    Stopped,

    /// The engine reached its natural fixed point; further runs are no-ops.
    Finished,
}

impl RunState {
    /// Whether the engine has reached its natural fixed point.
    pub fn is_finished(self) -> bool {
        self == RunState::Finished
    }

    /// Whether any `run_*` method has been called.
    pub fn started(self) -> bool {
        self != RunState::NotStarted
    }
}

/// Deadline/predicate bookkeeping for one `run_for`/`run_until` invocation.
///
/// Engines poll [`StopPolicy::should_stop`] at every checkpoint boundary and
/// nowhere else; there is no pre-emption.
#[derive(Debug)]
pub(crate) struct StopPolicy {
    deadline: Option<Instant>,
}

impl StopPolicy {
    /// A policy that never stops (plain `run`).
    pub(crate) fn none() -> Self {
        Self { deadline: None }
    }

    /// A policy that stops once `duration` has elapsed.
    pub(crate) fn timeout(duration: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + duration),
        }
    }

    /// Polled at checkpoint boundaries only.
    pub(crate) fn should_stop(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Reporting
// ------------------------------------------------------------------------------------------------

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Whether engines on this thread should emit periodic progress reports.
pub fn reporting_enabled() -> bool {
    REPORTING.with(Cell::get)
}

/// A scoped, thread-local switch for engine progress reports.
///
/// Progress reports go through [`tracing`] at `info` level; this guard only
/// gates the *periodic* per-checkpoint reports, not ordinary diagnostics.
/// Dropping the guard restores the previous state.
///
/// ```
/// use fpsemi::runner::ReportGuard;
///
/// let _rg = ReportGuard::new(false); // silence progress reports
/// ```
#[derive(Debug)]
pub struct ReportGuard {
    previous: bool,
}

impl ReportGuard {
    /// Enables or disables progress reports until the guard is dropped.
    pub fn new(enabled: bool) -> Self {
        let previous = REPORTING.with(|flag| flag.replace(enabled));
        Self { previous }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        REPORTING.with(|flag| flag.set(self.previous));
    }
}
