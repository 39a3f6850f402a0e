//! Construction of a well-formed [`FullTrace`] from per-location enter/leave events.
//!
//! Slots are built with one stack per location, which makes them laminar by construction.
//! All validation of trace data happens here, windowing assumes well-formed input.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::TraceError;
use crate::task_timer::TaskTimer;
use crate::trace::{FullTrace, SlotsByLocation, Trace, TraceData};
use crate::types::{
    CollectiveCommunication, Communication, Instant, Location, LocationId, Slot, SlotId,
};

#[derive(Debug, Default)]
pub struct TraceBuilder {
    locations: Vec<Location>,
    timelines: Vec<Timeline>,
    communications: Vec<Communication>,
    collectives: Vec<CollectiveCommunication>,
    names: HashMap<String, Rc<str>>,
    next_slot_id: u64,
}

#[derive(Debug, Default)]
struct Timeline {
    open: Vec<OpenSlot>,
    roots: Vec<Rc<Slot>>,
    last_time: Option<Instant>,
}

#[derive(Debug)]
struct OpenSlot {
    id: SlotId,
    name: Rc<str>,
    start: Instant,
    children: Vec<Rc<Slot>>,
}

impl TraceBuilder {
    pub fn new() -> TraceBuilder {
        TraceBuilder::default()
    }

    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        group: impl Into<String>,
    ) -> LocationId {
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(Location {
            id,
            name: name.into(),
            group: group.into(),
        });
        self.timelines.push(Timeline::default());
        id
    }

    /// Open a region on `location`. Events of one location must come in time order.
    pub fn enter(
        &mut self,
        location: LocationId,
        name: &str,
        time: Instant,
    ) -> Result<SlotId, TraceError> {
        let name = self.intern(name);
        let id = SlotId(self.next_slot_id);
        let timeline = self.timeline(location, time)?;
        timeline.open.push(OpenSlot {
            id,
            name,
            start: time,
            children: Vec::new(),
        });
        timeline.last_time = Some(time);
        self.next_slot_id += 1;
        Ok(id)
    }

    /// Close the innermost open region on `location`.
    pub fn leave(&mut self, location: LocationId, time: Instant) -> Result<(), TraceError> {
        let timeline = self.timeline(location, time)?;
        let Some(open) = timeline.open.pop() else {
            return Err(TraceError::UnmatchedLeave { location, time });
        };
        timeline.last_time = Some(time);

        let slot = Rc::new(Slot {
            id: open.id,
            name: open.name,
            location,
            start: open.start,
            end: time,
            clipped_start: false,
            clipped_end: false,
            children: open.children,
        });

        match timeline.open.last_mut() {
            Some(parent) => parent.children.push(slot),
            None => timeline.roots.push(slot),
        }
        Ok(())
    }

    /// Add a region without children, shorthand for `enter` followed by `leave`.
    pub fn add_slot(
        &mut self,
        location: LocationId,
        name: &str,
        start: Instant,
        end: Instant,
    ) -> Result<SlotId, TraceError> {
        if end < start {
            return Err(TraceError::NegativeDuration { start, end });
        }
        let id = self.enter(location, name, start)?;
        self.leave(location, end)?;
        Ok(id)
    }

    pub fn add_communication(
        &mut self,
        sender: LocationId,
        receiver: LocationId,
        start: Instant,
        end: Instant,
        tag: u32,
    ) -> Result<(), TraceError> {
        self.check_location(sender)?;
        self.check_location(receiver)?;
        if sender == receiver {
            return Err(TraceError::SelfMessage(sender));
        }
        if end < start {
            return Err(TraceError::NegativeDuration { start, end });
        }

        self.communications.push(Communication {
            start,
            end,
            sender,
            receiver,
            tag,
        });
        Ok(())
    }

    pub fn add_collective(
        &mut self,
        kind: &str,
        participants: &[LocationId],
        start: Instant,
        end: Instant,
    ) -> Result<(), TraceError> {
        if participants.is_empty() {
            return Err(TraceError::NoParticipants(kind.to_string()));
        }
        for participant in participants {
            self.check_location(*participant)?;
        }
        if end < start {
            return Err(TraceError::NegativeDuration { start, end });
        }

        let mut participants = participants.to_vec();
        participants.sort();
        participants.dedup();

        let kind = self.intern(kind);
        self.collectives.push(CollectiveCommunication {
            start,
            end,
            participants,
            kind,
        });
        Ok(())
    }

    /// Finish the trace. Fails if a region is still open on any location.
    pub fn build(self) -> Result<FullTrace, TraceError> {
        let t = TaskTimer::new("Building trace");

        let mut slots = SlotsByLocation::new();
        for (location, timeline) in self.locations.iter().zip(self.timelines) {
            if let Some(open) = timeline.open.first() {
                return Err(TraceError::UnclosedRegion {
                    location: location.id,
                    name: open.name.to_string(),
                    start: open.start,
                });
            }
            slots.insert(location.id, timeline.roots);
        }

        let mut communications = self.communications;
        communications.sort_by_key(|c| c.start);
        let mut collectives = self.collectives;
        collectives.sort_by_key(|c| c.start);

        let trace = FullTrace::new(TraceData {
            locations: self.locations.into(),
            slots,
            communications: communications.into_iter().map(Rc::new).collect(),
            collective_communications: collectives.into_iter().map(Rc::new).collect(),
        });

        log::info!(
            "Built trace with {} locations, {} slots, {} messages and {} collectives spanning {}",
            trace.locations().len(),
            trace.slot_count(),
            trace.communications().len(),
            trace.collective_communications().len(),
            trace.runtime(),
        );
        t.stop();

        Ok(trace)
    }

    /// The timeline of `location`, if an event at `time` may be added to it. Callers record
    /// `time` as the latest event once the event is accepted.
    fn timeline(
        &mut self,
        location: LocationId,
        time: Instant,
    ) -> Result<&mut Timeline, TraceError> {
        let timeline = self
            .timelines
            .get_mut(location.0 as usize)
            .ok_or(TraceError::UnknownLocation(location))?;

        if let Some(previous) = timeline.last_time {
            if time < previous {
                return Err(TraceError::OutOfOrder {
                    location,
                    time,
                    previous,
                });
            }
        }
        Ok(timeline)
    }

    fn check_location(&self, location: LocationId) -> Result<(), TraceError> {
        if (location.0 as usize) < self.locations.len() {
            Ok(())
        } else {
            Err(TraceError::UnknownLocation(location))
        }
    }

    fn intern(&mut self, name: &str) -> Rc<str> {
        if let Some(interned) = self.names.get(name) {
            return interned.clone();
        }
        let interned: Rc<str> = Rc::from(name);
        self.names.insert(name.to_string(), interned.clone());
        interned
    }
}
