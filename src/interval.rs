//! Closed-open interval arithmetic on [`Instant`]s.
//!
//! Extended entities `[start, end)` intersect a window when the intersection is non-empty.
//! Zero-duration entities are points and are selected when the point lies in the window.

use crate::error::WindowError;
use crate::types::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: Instant,
    end: Instant,
}

impl Interval {
    pub fn new(start: Instant, end: Instant) -> Result<Interval, WindowError> {
        if start > end {
            return Err(WindowError::InvertedWindow { begin: start, end });
        }
        Ok(Interval { start, end })
    }

    /// `[start, start + duration)`. A negative duration yields an empty interval.
    pub fn starting_at(start: Instant, duration: Duration) -> Interval {
        Interval {
            start,
            end: start + duration.max(Duration::ZERO),
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Restrict both bounds to `bounds`.
    pub fn clamp_to(&self, bounds: &Interval) -> Interval {
        Interval {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

pub fn intersect(a: &Interval, b: &Interval) -> Option<Interval> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (start < end).then_some(Interval { start, end })
}

pub fn contains(outer: &Interval, point: Instant) -> bool {
    outer.start <= point && point < outer.end
}

/// The part of `entity` inside `window`, or `None` if they are disjoint.
pub fn clip(entity: &Interval, window: &Interval) -> Option<Interval> {
    intersect(entity, window)
}

/// A window used for selecting entities.
///
/// `closed_end` makes zero-duration entities at exactly `end` visible. It is set when the
/// window reaches the end of the trace being windowed, so that the window covering a
/// whole trace selects every entity of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub interval: Interval,
    pub closed_end: bool,
}

impl Window {
    pub fn start(&self) -> Instant {
        self.interval.start
    }

    pub fn end(&self) -> Instant {
        self.interval.end
    }

    /// Does the entity `[start, end)` have to appear in the windowed trace?
    pub fn selects(&self, start: Instant, end: Instant) -> bool {
        if start == end {
            contains(&self.interval, start) || (self.closed_end && start == self.interval.end)
        } else {
            intersect(&Interval { start, end }, &self.interval).is_some()
        }
    }

    /// Does the closed hull `[start, end]` touch the closed window? Anything selected by
    /// [`Window::selects`], including descendants of the entity, passes this test.
    pub fn touches(&self, start: Instant, end: Instant) -> bool {
        start <= self.interval.end && self.interval.start <= end
    }

    /// Bounds of a selected entity after cutting it to the window.
    pub fn clip(&self, start: Instant, end: Instant) -> (Instant, Instant) {
        let clipped_start = start.clamp(self.interval.start, self.interval.end);
        let clipped_end = end.clamp(self.interval.start, self.interval.end);
        (clipped_start, clipped_end)
    }
}
