//! Aggregate statistics over a trace or a window of it.

use std::collections::HashMap;
use std::fmt::Write;
use std::rc::Rc;

use crate::trace::Trace;
use crate::types::{Duration, Instant, LocationId, Slot};

/// Count, extremes, mean and median of a series of values. Empty series have no extremes,
/// mean or median.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    values: Vec<f64>,
    total: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
        self.total += value;
        self.values.push(value);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.total / self.values.len() as f64)
    }

    pub fn median(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }

        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationSummary {
    pub location: LocationId,
    pub name: String,
    pub slot_count: usize,
    /// Time covered by root slots.
    pub busy_time: Duration,
    /// Durations of all slots, in ticks.
    pub slot_durations: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub name: Rc<str>,
    pub calls: usize,
    /// Sum of slot durations, nested calls of the same region counted each time.
    pub inclusive_time: Duration,
}

#[derive(Debug, Clone)]
pub struct TraceSummary {
    pub start_time: Instant,
    pub runtime: Duration,
    pub locations: Vec<LocationSummary>,
    /// Sorted by inclusive time, longest first.
    pub regions: Vec<RegionSummary>,
    pub communication_count: usize,
    pub collective_count: usize,
}

impl TraceSummary {
    pub fn of<T: Trace + ?Sized>(trace: &T) -> TraceSummary {
        let mut regions: HashMap<Rc<str>, RegionSummary> = HashMap::new();
        let mut locations = Vec::new();

        for location in trace.locations() {
            let roots = trace
                .slots()
                .get(&location.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut slot_durations = Statistics::new();
            add_slots(roots, &mut slot_durations, &mut regions);

            locations.push(LocationSummary {
                location: location.id,
                name: location.name.clone(),
                slot_count: slot_durations.count(),
                busy_time: roots
                    .iter()
                    .fold(Duration::ZERO, |busy, slot| busy + slot.duration()),
                slot_durations,
            });
        }

        let mut regions: Vec<RegionSummary> = regions.into_values().collect();
        regions.sort_by(|a, b| {
            b.inclusive_time
                .cmp(&a.inclusive_time)
                .then_with(|| a.name.cmp(&b.name))
        });

        TraceSummary {
            start_time: trace.start_time(),
            runtime: trace.runtime(),
            locations,
            regions,
            communication_count: trace.communications().len(),
            collective_count: trace.collective_communications().len(),
        }
    }

    /// Human readable report, listing at most `top_regions` regions.
    pub fn report(&self, top_regions: usize) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "window [{}, {}) runtime {}, {} messages, {} collectives",
            self.start_time.ticks(),
            (self.start_time + self.runtime).ticks(),
            self.runtime,
            self.communication_count,
            self.collective_count,
        );
        for location in &self.locations {
            let _ = write!(
                s,
                "  {} {}: {} slots, busy {}",
                location.location, location.name, location.slot_count, location.busy_time,
            );
            let durations = &location.slot_durations;
            if let (Some(min), Some(max), Some(mean), Some(median)) = (
                durations.min(),
                durations.max(),
                durations.mean(),
                durations.median(),
            ) {
                let _ = write!(
                    s,
                    ", slot length min {min:.0} max {max:.0} mean {mean:.1} median {median:.1}"
                );
            }
            let _ = writeln!(s);
        }
        for region in self.regions.iter().take(top_regions) {
            let _ = writeln!(
                s,
                "  region {}: {} calls, inclusive {}",
                region.name, region.calls, region.inclusive_time
            );
        }
        s
    }
}

fn add_slots(
    slots: &[Rc<Slot>],
    durations: &mut Statistics,
    regions: &mut HashMap<Rc<str>, RegionSummary>,
) {
    for slot in slots {
        durations.add_value(slot.duration().ticks() as f64);

        let region = regions
            .entry(slot.name.clone())
            .or_insert_with(|| RegionSummary {
                name: slot.name.clone(),
                calls: 0,
                inclusive_time: Duration::ZERO,
            });
        region.calls += 1;
        region.inclusive_time = region.inclusive_time + slot.duration();

        add_slots(&slot.children, durations, regions);
    }
}
