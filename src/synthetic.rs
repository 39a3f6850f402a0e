//! Seeded generator of synthetic traces.
//!
//! Produces nested regions per location with zero-length, adjacent and edge-touching slots
//! mixed in, plus messages and collectives between random locations. The same config always
//! produces the same trace.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::builder::TraceBuilder;
use crate::error::TraceError;
use crate::trace::FullTrace;
use crate::types::{Instant, LocationId};

const REGION_NAMES: [&str; 8] = [
    "main",
    "solve",
    "exchange_halo",
    "compute_flux",
    "MPI_Send",
    "MPI_Recv",
    "MPI_Allreduce",
    "write_checkpoint",
];

const COLLECTIVE_KINDS: [&str; 4] = ["barrier", "broadcast", "reduce", "allgather"];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub locations: usize,
    pub roots_per_location: usize,
    pub max_depth: usize,
    pub max_children: usize,
    /// Upper bound of a root slot's length, in ticks.
    pub max_root_length: i64,
    pub communications: usize,
    pub collectives: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            seed: 0,
            locations: 4,
            roots_per_location: 8,
            max_depth: 4,
            max_children: 3,
            max_root_length: 1000,
            communications: 32,
            collectives: 4,
        }
    }
}

impl SyntheticConfig {
    pub fn with_seed(seed: u64) -> Self {
        SyntheticConfig {
            seed,
            ..SyntheticConfig::default()
        }
    }
}

pub fn generate(config: &SyntheticConfig) -> Result<FullTrace, TraceError> {
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    let mut builder = TraceBuilder::new();

    let locations: Vec<LocationId> = (0..config.locations)
        .map(|i| builder.add_location(format!("rank {i}"), format!("node {}", i / 2)))
        .collect();

    let mut horizon = 1;
    for &location in &locations {
        let mut time = rng.random_range(0..50);
        for _ in 0..config.roots_per_location {
            let length = rng.random_range(0..=config.max_root_length.max(0));
            add_region(
                &mut builder,
                &mut rng,
                config,
                location,
                (time, time + length),
                config.max_depth,
            )?;
            // A gap of zero makes adjacent siblings.
            time += length + rng.random_range(0..20);
        }
        horizon = horizon.max(time);
    }

    if locations.len() >= 2 {
        for tag in 0..config.communications {
            let sender = rng.random_range(0..locations.len());
            let offset = rng.random_range(1..locations.len());
            let receiver = (sender + offset) % locations.len();
            let start = rng.random_range(0..horizon);
            let end = start + rng.random_range(0..=horizon / 4);
            builder.add_communication(
                locations[sender],
                locations[receiver],
                Instant(start),
                Instant(end),
                tag as u32,
            )?;
        }
    }

    if !locations.is_empty() {
        for _ in 0..config.collectives {
            let mut participants: Vec<LocationId> = locations
                .iter()
                .copied()
                .filter(|_| rng.random_bool(0.6))
                .collect();
            if participants.is_empty() {
                participants.push(locations[rng.random_range(0..locations.len())]);
            }
            let kind = COLLECTIVE_KINDS[rng.random_range(0..COLLECTIVE_KINDS.len())];
            let start = rng.random_range(0..horizon);
            let end = start + rng.random_range(0..=horizon / 8);
            builder.add_collective(kind, &participants, Instant(start), Instant(end))?;
        }
    }

    builder.build()
}

/// Add a region covering `bounds` with randomly nested children.
fn add_region(
    builder: &mut TraceBuilder,
    rng: &mut ChaCha20Rng,
    config: &SyntheticConfig,
    location: LocationId,
    bounds: (i64, i64),
    depth_left: usize,
) -> Result<(), TraceError> {
    let (start, end) = bounds;
    let name = REGION_NAMES[rng.random_range(0..REGION_NAMES.len())];
    builder.enter(location, name, Instant(start))?;

    if depth_left > 0 {
        let children = rng.random_range(0..=config.max_children);
        // Sorted cut points taken in pairs give ordered, disjoint children that may be empty,
        // adjacent or touching the parent's edges.
        let mut cuts: Vec<i64> = (0..children * 2)
            .map(|_| rng.random_range(start..=end))
            .collect();
        cuts.sort_unstable();
        for pair in cuts.chunks_exact(2) {
            add_region(
                builder,
                rng,
                config,
                location,
                (pair[0], pair[1]),
                depth_left - 1,
            )?;
        }
    }

    builder.leave(location, Instant(end))
}
