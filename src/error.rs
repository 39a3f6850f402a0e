//! Error types of the trace model, the windowing engine and the selection session.

use thiserror::Error;

use crate::types::{Instant, LocationId};

/// A window whose bounds are in the wrong order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("window begin {begin} is after window end {end}")]
    InvertedWindow { begin: Instant, end: Instant },
}

/// Rejected bound change on a [`crate::selection::SelectionSession`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection begin {begin} must be before selection end {end}")]
    EmptyWindow { begin: Instant, end: Instant },

    #[error("bound {value} is outside of the trace [{start}, {end}]")]
    OutOfRange {
        value: Instant,
        start: Instant,
        end: Instant,
    },
}

/// Malformed input handed to [`crate::builder::TraceBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("unknown location {0}")]
    UnknownLocation(LocationId),

    #[error("event at {time} on {location} is earlier than the previous event at {previous}")]
    OutOfOrder {
        location: LocationId,
        time: Instant,
        previous: Instant,
    },

    #[error("leave at {time} on {location} without a matching enter")]
    UnmatchedLeave { location: LocationId, time: Instant },

    #[error("region '{name}' entered on {location} at {start} is never left")]
    UnclosedRegion {
        location: LocationId,
        name: String,
        start: Instant,
    },

    #[error("entity ends at {end} before it starts at {start}")]
    NegativeDuration { start: Instant, end: Instant },

    #[error("message from {0} to itself")]
    SelfMessage(LocationId),

    #[error("collective '{0}' has no participants")]
    NoParticipants(String),
}
