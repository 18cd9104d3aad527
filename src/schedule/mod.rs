//! Conflict detection, free-slot search and scheduling heuristics.
//!
//! Everything in here is pure: callers fetch the event list once from the
//! store and pass it in, along with an explicit reference instant where one
//! is needed.

mod conflict;
mod patterns;
mod slots;

pub use conflict::*;
pub use patterns::*;
pub use slots::*;

/// Precondition violations for schedule operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("max_suggestions must be at least 1")]
    InvalidMaxSuggestions,
    #[error("duration must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),
}
