//! Reads traces from JSON files, optionally gzip-compressed.
//!
//! Locations are referenced by their index in `locations`. Region events of a location are
//! given as enter/leave pairs in time order:
//!
//! ```json
//! {
//!   "locations": [{ "name": "rank 0", "group": "node-a" }, { "name": "rank 1" }],
//!   "events": [
//!     { "location": 0, "enter": "main", "time": 0 },
//!     { "location": 0, "leave": 1000 }
//!   ],
//!   "communications": [{ "sender": 0, "receiver": 1, "start": 50, "end": 150, "tag": 7 }],
//!   "collectives": [{ "kind": "barrier", "participants": [0, 1], "start": 10, "end": 20 }]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::builder::TraceBuilder;
use crate::error::TraceError;
use crate::task_timer::TaskTimer;
use crate::trace::FullTrace;
use crate::types::{Instant, LocationId};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrace {
    #[serde(default)]
    pub locations: Vec<RawLocation>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub communications: Vec<RawCommunication>,
    #[serde(default)]
    pub collectives: Vec<RawCollective>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    pub name: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEvent {
    Enter {
        location: u32,
        enter: String,
        time: i64,
    },
    Leave {
        location: u32,
        leave: i64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommunication {
    pub sender: u32,
    pub receiver: u32,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub tag: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCollective {
    pub kind: String,
    pub participants: Vec<u32>,
    pub start: i64,
    pub end: i64,
}

pub fn read_trace_file(path: &Path) -> Result<FullTrace> {
    log::info!("Loading trace file {}", path.display());

    let mut file_bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut file| file.read_to_end(&mut file_bytes))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_trace(&file_bytes).with_context(|| format!("Failed to load {}", path.display()))
}

/// Parse a trace from the contents of a trace file.
pub fn parse_trace(file_bytes: &[u8]) -> Result<FullTrace> {
    let t = TaskTimer::new("Parsing trace file");

    let raw: RawTrace = if file_bytes.starts_with(&GZIP_MAGIC) {
        let mut decompressed = Vec::new();
        GzDecoder::new(file_bytes)
            .read_to_end(&mut decompressed)
            .context("Failed to decompress gzip trace")?;
        serde_json::from_slice(&decompressed)?
    } else {
        let file_str = std::str::from_utf8(file_bytes)
            .map_err(|e| anyhow::anyhow!("File is not UTF8!: {}", e))?;
        serde_json::from_str(file_str)?
    };
    t.stop();

    Ok(build_trace(raw)?)
}

/// Turn decoded JSON into a validated trace.
pub fn build_trace(raw: RawTrace) -> Result<FullTrace, TraceError> {
    let mut builder = TraceBuilder::new();
    for location in raw.locations {
        builder.add_location(location.name, location.group);
    }

    for event in &raw.events {
        match event {
            RawEvent::Enter {
                location,
                enter,
                time,
            } => {
                builder.enter(LocationId(*location), enter, Instant(*time))?;
            }
            RawEvent::Leave { location, leave } => {
                builder.leave(LocationId(*location), Instant(*leave))?;
            }
        }
    }

    for c in &raw.communications {
        builder.add_communication(
            LocationId(c.sender),
            LocationId(c.receiver),
            Instant(c.start),
            Instant(c.end),
            c.tag,
        )?;
    }

    for c in &raw.collectives {
        let participants: Vec<LocationId> =
            c.participants.iter().copied().map(LocationId).collect();
        builder.add_collective(&c.kind, &participants, Instant(c.start), Instant(c.end))?;
    }

    builder.build()
}
