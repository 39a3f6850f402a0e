//! The windowing engine: derive the part of a trace that is visible in a time window.
//!
//! Slots are selected per location by walking the laminar slot trees. Siblings are disjoint
//! and ordered by start time, so their end times are ordered too and the first sibling that
//! can reach the window is found with a binary search. Subtrees of slots that don't touch the
//! window are never visited.

use std::rc::Rc;

use crate::interval::{Interval, Window};
use crate::task_timer::TaskTimer;
use crate::trace::{SlotsByLocation, SubTrace, Trace, TraceData};
use crate::types::{Instant, Slot};

/// Produce the window `window` of `source`.
///
/// `window` is given in absolute coordinates and clamped to the bounds of `source`. Slots
/// crossing a window edge are cut to the window. Messages and collectives are kept unmodified
/// if they intersect the window at all.
///
/// A window past the end of `source` collapses to its last instant and keeps only the
/// zero-duration entities sitting there. A window before the start selects nothing.
pub fn compute_subtrace<T: Trace + ?Sized>(source: &T, window: Interval) -> SubTrace {
    let t = TaskTimer::new("Computing subtrace");

    let bounds = source.bounds();
    let interval = window.clamp_to(&bounds);
    let window = Window {
        interval,
        closed_end: interval.end() == bounds.end(),
    };

    let mut slots = SlotsByLocation::new();
    for (location, roots) in source.slots() {
        let mut windowed = Vec::new();
        window_slots(roots, &window, &mut windowed);
        slots.insert(*location, windowed);
    }

    let communications = select_start_ordered(source.communications(), &window, |c| {
        (c.start, c.end)
    });
    let collective_communications =
        select_start_ordered(source.collective_communications(), &window, |c| {
            (c.start, c.end)
        });

    let data = TraceData {
        locations: source.data().locations.clone(),
        slots,
        communications,
        collective_communications,
    };
    let subtrace = SubTrace::new(data, interval);

    log::debug!(
        "Subtrace [{}, {}): {} slots, {} messages, {} collectives",
        interval.start().ticks(),
        interval.end().ticks(),
        subtrace.slot_count(),
        subtrace.communications().len(),
        subtrace.collective_communications().len(),
    );
    t.stop();

    subtrace
}

/// Append the windowed copies of `siblings` that are visible in `window` to `windowed`.
fn window_slots(siblings: &[Rc<Slot>], window: &Window, windowed: &mut Vec<Rc<Slot>>) {
    let first = siblings.partition_point(|slot| slot.end < window.start());

    for slot in &siblings[first..] {
        if !window.touches(slot.start, slot.end) {
            break;
        }

        if window.selects(slot.start, slot.end) {
            windowed.push(Rc::new(clip_slot(slot, window)));
        } else {
            // The slot only touches an edge of the window, zero-duration children sitting on
            // that edge are still visible and move up to the closest visible ancestor.
            window_slots(&slot.children, window, windowed);
        }
    }
}

fn clip_slot(slot: &Slot, window: &Window) -> Slot {
    let (start, end) = window.clip(slot.start, slot.end);

    let mut children = Vec::new();
    window_slots(&slot.children, window, &mut children);

    Slot {
        id: slot.id,
        name: slot.name.clone(),
        location: slot.location,
        start,
        end,
        clipped_start: slot.clipped_start || start != slot.start,
        clipped_end: slot.clipped_end || end != slot.end,
        children,
    }
}

/// Select the entities visible in `window` from a list ordered by start time.
fn select_start_ordered<E>(
    entities: &[Rc<E>],
    window: &Window,
    bounds: impl Fn(&E) -> (Instant, Instant),
) -> Vec<Rc<E>> {
    let candidates = entities.partition_point(|entity| bounds(entity).0 <= window.end());

    entities[..candidates]
        .iter()
        .filter(|entity| {
            let (start, end) = bounds(entity);
            window.selects(start, end)
        })
        .cloned()
        .collect()
}
