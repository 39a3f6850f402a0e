use std::fmt;
use std::ops::{Add, Div, Sub};
use std::rc::Rc;

/// Ticks since the trace epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(pub i64);

/// Signed number of ticks between two instants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub i64);

impl Instant {
    pub const ZERO: Instant = Instant(0);

    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Duration elapsed since `earlier`. Negative if `earlier` is after `self`.
    pub fn since(self, earlier: Instant) -> Duration {
        Duration(self.0 - earlier.0)
    }

    /// `self + offset`, stopping at the ends of the tick range instead of overflowing.
    pub fn saturating_add(self, offset: Duration) -> Instant {
        Instant(self.0.saturating_add(offset.0))
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn ticks(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        Instant(self.0 - rhs.0)
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.since(rhs)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Div<i64> for Duration {
    type Output = Duration;

    fn div(self, rhs: i64) -> Duration {
        Duration(self.0 / rhs)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

/// Index of a location in the trace's location table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One timeline (process or thread) of the traced program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Process, rank or node the location belongs to.
    pub group: String,
}

/// Identity of a slot, stable across windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

/// One execution of a region on a location.
///
/// Slots on a location form a laminar family: `children` lie inside the slot's own interval,
/// are pairwise disjoint and ordered by start time. A windowed copy keeps `id` and `name` and
/// records which of its ends were cut by the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub name: Rc<str>,
    pub location: LocationId,
    pub start: Instant,
    pub end: Instant,
    pub clipped_start: bool,
    pub clipped_end: bool,
    pub children: Vec<Rc<Slot>>,
}

impl Slot {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_clipped(&self) -> bool {
        self.clipped_start || self.clipped_end
    }

    /// Number of slots in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.subtree_len())
            .sum::<usize>()
    }
}

/// A point-to-point message from `sender` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Communication {
    pub start: Instant,
    pub end: Instant,
    pub sender: LocationId,
    pub receiver: LocationId,
    pub tag: u32,
}

/// A group operation (barrier, broadcast, reduce, ...) spanning several locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectiveCommunication {
    pub start: Instant,
    pub end: Instant,
    pub participants: Vec<LocationId>,
    pub kind: Rc<str>,
}

/// Collect all slots of the given trees in depth-first pre-order.
pub fn collect_all_slots(roots: &[Rc<Slot>], collected: &mut Vec<Rc<Slot>>) {
    for slot in roots {
        collected.push(slot.clone());
        collect_all_slots(&slot.children, collected);
    }
}

/// Convert a slot tree to a string, mostly useful for debugging and test failure messages.
pub fn stringify_slot(slot: &Slot, include_children: bool) -> String {
    let clip = match (slot.clipped_start, slot.clipped_end) {
        (false, false) => "",
        (true, false) => " clipped(start)",
        (false, true) => " clipped(end)",
        (true, true) => " clipped(both)",
    };
    let mut s = format!(
        "{} #{} on {} [{}, {}){}",
        slot.name, slot.id.0, slot.location, slot.start.0, slot.end.0, clip
    );

    if include_children && !slot.children.is_empty() {
        s.push_str(" {");
        for child in &slot.children {
            s.push_str(&format!(" {}", stringify_slot(child, true)));
        }
        s.push_str(" }");
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_arithmetic() {
        let a = Instant(100);
        let b = a + Duration(50);
        assert_eq!(b, Instant(150));
        assert_eq!(b - a, Duration(50));
        assert_eq!(a - b, Duration(-50));
        assert_eq!(Duration(100) / 3, Duration(33));
        assert!(Instant(-1) < Instant::ZERO);
        assert_eq!(Instant(10).saturating_add(Duration(i64::MAX)), Instant(i64::MAX));
        assert_eq!(Instant(-10).saturating_add(Duration(i64::MIN)), Instant(i64::MIN));
    }
}
