//! Selection session: the currently selected time window of an open trace and the subtrace
//! derived for it.
//!
//! Every successful bound change recomputes the subtrace from the full trace, bumps the version
//! and notifies each observer exactly once. Rejected changes leave everything as it was.

use std::rc::Rc;

use crate::config::Config;
use crate::error::SelectionError;
use crate::interval::Interval;
use crate::subtrace::compute_subtrace;
use crate::trace::{FullTrace, SubTrace, Trace};
use crate::types::{Duration, Instant};

pub type ObserverId = usize;

/// Called with the new version after each selection update.
pub type Observer = Box<dyn FnMut(u64)>;

pub struct SelectionSession {
    full_trace: Rc<FullTrace>,
    begin: Instant,
    end: Instant,
    selection: Rc<SubTrace>,
    version: u64,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: ObserverId,
}

impl SelectionSession {
    pub fn new(full_trace: Rc<FullTrace>) -> SelectionSession {
        SelectionSession::with_config(full_trace, &Config::default())
    }

    /// Start with the first `1 / config.initial_window_divisor` of the trace selected.
    pub fn with_config(full_trace: Rc<FullTrace>, config: &Config) -> SelectionSession {
        let begin = full_trace.start_time();
        let runtime = full_trace.runtime();
        let mut length = runtime / config.window_divisor();
        if length.is_zero() && runtime > Duration::ZERO {
            length = Duration(1);
        }
        let end = begin + length;

        let selection = compute_subtrace(&*full_trace, Interval::starting_at(begin, length));
        SelectionSession {
            full_trace,
            begin,
            end,
            selection: Rc::new(selection),
            version: 0,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    pub fn full_trace(&self) -> &Rc<FullTrace> {
        &self.full_trace
    }

    pub fn begin(&self) -> Instant {
        self.begin
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    /// The subtrace for the current bounds. Its window always equals `[begin, end)`.
    pub fn selection(&self) -> Rc<SubTrace> {
        self.selection.clone()
    }

    /// Incremented on every successful bound change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_begin(&mut self, new_begin: Instant) -> Result<(), SelectionError> {
        self.check_in_range(new_begin)?;
        if new_begin >= self.end {
            return Err(SelectionError::EmptyWindow {
                begin: new_begin,
                end: self.end,
            });
        }
        self.update_selection(new_begin, self.end);
        Ok(())
    }

    pub fn set_end(&mut self, new_end: Instant) -> Result<(), SelectionError> {
        self.check_in_range(new_end)?;
        if new_end <= self.begin {
            return Err(SelectionError::EmptyWindow {
                begin: self.begin,
                end: new_end,
            });
        }
        self.update_selection(self.begin, new_end);
        Ok(())
    }

    /// Replace both bounds at once.
    pub fn set_period(
        &mut self,
        new_begin: Instant,
        new_end: Instant,
    ) -> Result<(), SelectionError> {
        self.check_in_range(new_begin)?;
        self.check_in_range(new_end)?;
        if new_begin >= new_end {
            return Err(SelectionError::EmptyWindow {
                begin: new_begin,
                end: new_end,
            });
        }
        self.update_selection(new_begin, new_end);
        Ok(())
    }

    /// Select the whole trace. Returns false, and notifies no one, if the whole trace is
    /// already selected. That is always the case for a trace without runtime, whose only
    /// selection is the empty window at its start.
    pub fn reset_to_full(&mut self) -> bool {
        let bounds = self.full_trace.bounds();
        if (self.begin, self.end) == (bounds.start(), bounds.end()) {
            return false;
        }
        self.update_selection(bounds.start(), bounds.end());
        true
    }

    pub fn subscribe(&mut self, observer: impl FnMut(u64) + 'static) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if there was no observer with this id.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn check_in_range(&self, value: Instant) -> Result<(), SelectionError> {
        let start = self.full_trace.start_time();
        let end = self.full_trace.end_time();
        if value < start || value > end {
            return Err(SelectionError::OutOfRange { value, start, end });
        }
        Ok(())
    }

    fn update_selection(&mut self, begin: Instant, end: Instant) {
        let window = Interval::starting_at(begin, end - begin);
        let selection = compute_subtrace(&*self.full_trace, window);

        self.begin = begin;
        self.end = end;
        self.selection = Rc::new(selection);
        self.version += 1;

        log::debug!(
            "Selection updated to [{}, {}), version {}",
            begin.ticks(),
            end.ticks(),
            self.version
        );
        for (_, observer) in &mut self.observers {
            observer(self.version);
        }
    }
}
