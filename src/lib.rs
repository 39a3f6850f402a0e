pub mod builder;
pub mod config;
pub mod error;
pub mod interval;
pub mod reader;
pub mod selection;
pub mod subtrace;
pub mod summary;
pub mod synthetic;
pub mod task_timer;
pub mod trace;
pub mod types;

pub use builder::TraceBuilder;
pub use error::{SelectionError, TraceError, WindowError};
pub use interval::Interval;
pub use selection::SelectionSession;
pub use subtrace::compute_subtrace;
pub use trace::{FullTrace, SubTrace, Trace};
pub use types::{Duration, Instant, LocationId, Slot};
