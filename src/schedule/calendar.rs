// src/schedule/calendar.rs

//! Calendar policy injected into the forward/backward pass.
//!
//! Time is measured in abstract integer units (typically days) counted from
//! an arbitrary origin. A unit `t` covers the interval `[t, t + 1)`. A
//! calendar decides which units are working time and therefore how a
//! duration maps onto a start/finish pair.

use std::collections::BTreeSet;
use std::fmt::Debug;

/// Translates durations into start/finish boundaries.
///
/// All methods must treat a zero (or negative) duration as an instant:
/// start and finish coincide. `None` means the boundary falls outside the
/// representable time range.
pub trait Calendar: Debug + Send + Sync {
    /// Earliest boundary at which work can actually begin at or after `t`.
    fn align_start(&self, t: i64) -> Option<i64> {
        Some(t)
    }

    /// Latest boundary at or before `t` at which work can have ended.
    fn align_finish(&self, t: i64) -> Option<i64> {
        Some(t)
    }

    /// Finish boundary of `duration` working units beginning at `start`.
    fn finish_from(&self, start: i64, duration: i64) -> Option<i64>;

    /// Start boundary of `duration` working units ending at `finish`.
    fn start_from(&self, finish: i64, duration: i64) -> Option<i64>;
}

/// Every unit is working time; plain arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousCalendar;

impl Calendar for ContinuousCalendar {
    fn finish_from(&self, start: i64, duration: i64) -> Option<i64> {
        start.checked_add(duration.max(0))
    }

    fn start_from(&self, finish: i64, duration: i64) -> Option<i64> {
        finish.checked_sub(duration.max(0))
    }
}

/// Working time everywhere except an explicit set of non-working units
/// (holidays, shutdown days).
#[derive(Debug, Clone, Default)]
pub struct ExceptionCalendar {
    non_working: BTreeSet<i64>,
}

impl ExceptionCalendar {
    pub fn new(non_working: impl IntoIterator<Item = i64>) -> Self {
        Self {
            non_working: non_working.into_iter().collect(),
        }
    }

    pub fn is_working(&self, unit: i64) -> bool {
        !self.non_working.contains(&unit)
    }
}

impl Calendar for ExceptionCalendar {
    fn align_start(&self, t: i64) -> Option<i64> {
        let mut unit = t;
        while !self.is_working(unit) {
            unit = unit.checked_add(1)?;
        }
        Some(unit)
    }

    fn align_finish(&self, t: i64) -> Option<i64> {
        let mut boundary = t;
        while !self.is_working(boundary.checked_sub(1)?) {
            boundary -= 1;
        }
        Some(boundary)
    }

    // Grow the window by the holidays it covers until a stretch covers none.
    fn finish_from(&self, start: i64, duration: i64) -> Option<i64> {
        if duration <= 0 {
            return Some(start);
        }
        let mut scanned = start;
        let mut finish = start.checked_add(duration)?;
        loop {
            let skipped = self.non_working.range(scanned..finish).count();
            if skipped == 0 {
                return Some(finish);
            }
            scanned = finish;
            finish = finish.checked_add(i64::try_from(skipped).ok()?)?;
        }
    }

    fn start_from(&self, finish: i64, duration: i64) -> Option<i64> {
        if duration <= 0 {
            return Some(finish);
        }
        let mut scanned = finish;
        let mut start = finish.checked_sub(duration)?;
        loop {
            let skipped = self.non_working.range(start..scanned).count();
            if skipped == 0 {
                return Some(start);
            }
            scanned = start;
            start = start.checked_sub(i64::try_from(skipped).ok()?)?;
        }
    }
}
