//! Append-only in-memory event log.
//!
//! Events are stored in sequence order and never modified or removed.
//! `Sequence(n)` lives at index `n - 1`, so a reader whose cursor is the
//! last sequence it saw finds its next event at index `cursor`.

use crate::error::{HubError, HubResult};
use crate::hub::types::{Event, HubConfig};
use crate::types::{Sequence, Timestamp};
use parking_lot::RwLock;
use std::sync::Arc;

/// Why the log stopped accepting appends.
#[derive(Clone, Debug)]
enum CloseReason {
    Shutdown,
    Exhausted(String),
}

impl CloseReason {
    fn to_error(&self) -> HubError {
        match self {
            CloseReason::Shutdown => HubError::Closed,
            CloseReason::Exhausted(reason) => HubError::Exhausted(reason.clone()),
        }
    }
}

struct LogState<T> {
    events: Vec<Arc<Event<T>>>,
    closed: Option<CloseReason>,
}

/// Result of reading the log at a cursor.
pub(crate) enum LogRead<T> {
    /// The event following the cursor.
    Event(Arc<Event<T>>),
    /// Nothing after the cursor yet.
    Pending,
    /// Nothing after the cursor and nothing will ever be appended.
    Closed,
}

/// Why an append was refused.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AppendError {
    /// The log was already closed before this append.
    Closed(HubError),
    /// This append hit the limit and closed the log.
    Exhausted(String),
}

impl From<AppendError> for HubError {
    fn from(err: AppendError) -> Self {
        match err {
            AppendError::Closed(err) => err,
            AppendError::Exhausted(reason) => HubError::Exhausted(reason),
        }
    }
}

/// Append-only event log.
pub struct EventLog<T> {
    state: RwLock<LogState<T>>,

    /// Max events before the log is exhausted.
    max_events: Option<usize>,
}

impl<T> EventLog<T> {
    /// Create an empty log.
    pub fn new(config: &HubConfig) -> Self {
        let capacity = match config.max_events {
            Some(max) => config.initial_capacity.min(max),
            None => config.initial_capacity,
        };

        Self {
            state: RwLock::new(LogState {
                events: Vec::with_capacity(capacity),
                closed: None,
            }),
            max_events: config.max_events,
        }
    }

    /// Append a payload, assigning the next sequence number.
    ///
    /// The write lock is held only while the sequence is assigned and the
    /// event stored.
    pub fn append(&self, payload: T) -> HubResult<Arc<Event<T>>> {
        self.try_append(payload).map_err(HubError::from)
    }

    /// Like `append`, but tells the first exhausting append apart from
    /// appends refused by an already closed log.
    pub(crate) fn try_append(&self, payload: T) -> Result<Arc<Event<T>>, AppendError> {
        let mut state = self.state.write();

        if let Some(reason) = &state.closed {
            return Err(AppendError::Closed(reason.to_error()));
        }

        let at_limit = self
            .max_events
            .is_some_and(|max| state.events.len() >= max);
        if at_limit || state.events.try_reserve(1).is_err() {
            let reason = if at_limit {
                format!("event log reached its limit of {} events", state.events.len())
            } else {
                format!("cannot grow event log past {} events", state.events.len())
            };
            state.closed = Some(CloseReason::Exhausted(reason.clone()));
            return Err(AppendError::Exhausted(reason));
        }

        let event = Arc::new(Event {
            sequence: Sequence(state.events.len() as u64 + 1),
            timestamp: Timestamp::now(),
            payload,
        });
        state.events.push(Arc::clone(&event));

        Ok(event)
    }

    /// Read the event following `cursor`.
    ///
    /// The closed flag is checked under the same lock as the entry, so a
    /// reader never sees `Closed` while events remain after its cursor.
    pub(crate) fn read_after(&self, cursor: Sequence) -> LogRead<T> {
        let state = self.state.read();
        match state.events.get(cursor.0 as usize) {
            Some(event) => LogRead::Event(Arc::clone(event)),
            None if state.closed.is_some() => LogRead::Closed,
            None => LogRead::Pending,
        }
    }

    /// Snapshot of every event after `cursor`.
    pub fn events_after(&self, cursor: Sequence) -> Vec<Arc<Event<T>>> {
        let state = self.state.read();
        let start = (cursor.0 as usize).min(state.events.len());
        state.events[start..].to_vec()
    }

    /// Sequence of the last appended event (`Sequence(0)` when empty).
    pub fn head(&self) -> Sequence {
        Sequence(self.state.read().events.len() as u64)
    }

    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting appends. Returns false if the log was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.state.write();
        if state.closed.is_some() {
            return false;
        }
        state.closed = Some(CloseReason::Shutdown);
        true
    }

    /// Close the log as exhausted. An earlier close reason is kept and
    /// false is returned.
    pub(crate) fn exhaust(&self, reason: String) -> bool {
        let mut state = self.state.write();
        if state.closed.is_some() {
            return false;
        }
        state.closed = Some(CloseReason::Exhausted(reason));
        true
    }

    /// The error appends currently fail with, if the log is closed.
    pub fn closed_error(&self) -> Option<HubError> {
        self.state.read().closed.as_ref().map(CloseReason::to_error)
    }
}
