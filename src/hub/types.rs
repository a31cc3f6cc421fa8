//! Hub types: events, subscription ids and configuration.

use crate::types::{Sequence, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable entry of the hub's log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    /// Position in the log (assigned by the hub).
    pub sequence: Sequence,

    /// When the event was appended.
    pub timestamp: Timestamp,

    pub payload: T,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Hub configuration.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Max events the log may hold. Reaching it exhausts the hub.
    /// Default: None (bounded by memory only)
    pub max_events: Option<usize>,

    /// Log capacity reserved up front.
    /// Default: 1024
    pub initial_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_events: None,
            initial_capacity: 1024,
        }
    }
}

/// Where a new subscription starts reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// Replay the whole log, then follow live events.
    #[default]
    Beginning,

    /// Skip history; only events appended after subscribing.
    Live,

    /// Resume after the given sequence (clamped to the current head).
    After(Sequence),
}

/// Configuration for a subscription.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionConfig {
    pub start: StartPosition,
}

impl SubscriptionConfig {
    pub fn live() -> Self {
        Self {
            start: StartPosition::Live,
        }
    }

    pub fn after(sequence: Sequence) -> Self {
        Self {
            start: StartPosition::After(sequence),
        }
    }
}
