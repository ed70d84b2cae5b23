// src/schedule/mod.rs

//! Schedule computation over a validated task graph.
//!
//! - [`calculator`] runs the forward/backward pass and derives slack and
//!   the critical path.
//! - [`calendar`] holds the injected policy that maps durations onto
//!   working time.
//! - [`snapshot`] is the immutable, atomically published result.

pub mod calculator;
pub mod calendar;
pub mod snapshot;

pub use calculator::{compute_schedule, ScheduleOptions};
pub use calendar::{Calendar, ContinuousCalendar, ExceptionCalendar};
pub use snapshot::{ScheduleSnapshot, TaskSchedule};
