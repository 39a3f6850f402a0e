//! The Trace capability and its two variants: the [`FullTrace`] produced at load time and the
//! [`SubTrace`] produced by windowing.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::WindowError;
use crate::interval::Interval;
use crate::subtrace::compute_subtrace;
use crate::types::{
    collect_all_slots, CollectiveCommunication, Communication, Duration, Instant, Location,
    LocationId, Slot,
};

/// Root slots of each location, ordered by start time.
pub type SlotsByLocation = BTreeMap<LocationId, Vec<Rc<Slot>>>;

/// Anything that exposes trace entities: the full trace or a window of it.
pub trait Trace {
    /// Entity collections of this trace.
    fn data(&self) -> &TraceData;

    /// Absolute start of the trace.
    fn start_time(&self) -> Instant;

    /// Total time spanned, starting at [`Trace::start_time`].
    fn runtime(&self) -> Duration;

    fn end_time(&self) -> Instant {
        self.start_time() + self.runtime()
    }

    fn bounds(&self) -> Interval {
        Interval::starting_at(self.start_time(), self.runtime())
    }

    /// Window this trace to `[start_time + from, start_time + to)`.
    ///
    /// Offsets are relative to this trace's own start. Offsets outside of the trace are
    /// clamped to its bounds, `from > to` is rejected.
    fn subtrace(&self, from: Duration, to: Duration) -> Result<SubTrace, WindowError> {
        let window = Interval::new(
            self.start_time().saturating_add(from),
            self.start_time().saturating_add(to),
        )?;
        Ok(compute_subtrace(self, window))
    }

    /// All locations of the trace. Windowing never removes locations.
    fn locations(&self) -> &[Location] {
        &self.data().locations
    }

    /// Root slots per location. Every location has an entry, possibly empty.
    fn slots(&self) -> &SlotsByLocation {
        &self.data().slots
    }

    /// Point-to-point messages ordered by start time.
    fn communications(&self) -> &[Rc<Communication>] {
        &self.data().communications
    }

    /// Collective operations ordered by start time.
    fn collective_communications(&self) -> &[Rc<CollectiveCommunication>] {
        &self.data().collective_communications
    }

    /// All slots in depth-first pre-order, location by location.
    fn all_slots(&self) -> Vec<Rc<Slot>> {
        let mut collected = Vec::new();
        for roots in self.slots().values() {
            collect_all_slots(roots, &mut collected);
        }
        collected
    }

    fn slot_count(&self) -> usize {
        self.slots()
            .values()
            .flat_map(|roots| roots.iter())
            .map(|slot| slot.subtree_len())
            .sum()
    }

    fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations().get(id.0 as usize)
    }
}

/// Entity collections shared by both trace variants.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    pub locations: Rc<[Location]>,
    pub slots: SlotsByLocation,
    pub communications: Vec<Rc<Communication>>,
    pub collective_communications: Vec<Rc<CollectiveCommunication>>,
}

/// The complete trace as handed over by the reader. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FullTrace {
    data: TraceData,
    start_time: Instant,
    runtime: Duration,
}

impl FullTrace {
    /// Wrap already validated data. Start time and runtime are computed from the entities.
    pub fn new(data: TraceData) -> FullTrace {
        let (start_time, end_time) =
            min_max_time(&data).unwrap_or((Instant::ZERO, Instant::ZERO));
        FullTrace {
            data,
            start_time,
            runtime: end_time - start_time,
        }
    }
}

/// A window of another trace, produced by [`compute_subtrace`].
///
/// Timestamps stay in the coordinates of the full trace. The start time is the window's lower
/// bound, whether or not an entity begins there.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTrace {
    data: TraceData,
    window: Interval,
}

impl SubTrace {
    pub(crate) fn new(data: TraceData, window: Interval) -> SubTrace {
        SubTrace { data, window }
    }

    pub fn window(&self) -> Interval {
        self.window
    }
}

impl Trace for FullTrace {
    fn data(&self) -> &TraceData {
        &self.data
    }

    fn start_time(&self) -> Instant {
        self.start_time
    }

    fn runtime(&self) -> Duration {
        self.runtime
    }
}

impl Trace for SubTrace {
    fn data(&self) -> &TraceData {
        &self.data
    }

    fn start_time(&self) -> Instant {
        self.window.start()
    }

    fn runtime(&self) -> Duration {
        self.window.duration()
    }
}

fn min_max_time(data: &TraceData) -> Option<(Instant, Instant)> {
    let slot_bounds = data
        .slots
        .values()
        .flat_map(|roots| roots.iter())
        .map(|slot| (slot.start, slot.end));
    let communication_bounds = data.communications.iter().map(|c| (c.start, c.end));
    let collective_bounds = data
        .collective_communications
        .iter()
        .map(|c| (c.start, c.end));

    let mut min_max: Option<(Instant, Instant)> = None;
    for (start, end) in slot_bounds
        .chain(communication_bounds)
        .chain(collective_bounds)
    {
        match &mut min_max {
            Some((min_time, max_time)) => {
                *min_time = (*min_time).min(start);
                *max_time = (*max_time).max(end);
            }
            None => min_max = Some((start, end)),
        }
    }

    min_max
}
