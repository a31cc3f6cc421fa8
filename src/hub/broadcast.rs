//! Broadcast hub: an ordered event log fanned out to every subscription.

use crate::error::{HubError, HubResult};
use crate::hub::log::{AppendError, EventLog};
use crate::hub::subscription::{CursorSlot, Subscription};
use crate::hub::types::{Event, HubConfig, StartPosition, SubscriptionConfig, SubscriptionId};
use crate::types::Sequence;
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Registry entry for an active subscription.
struct Registered {
    slot: Arc<CursorSlot>,
    /// Wakeup signal. Capacity 1: a full doorbell already means "look again".
    doorbell: Sender<()>,
}

/// State shared by the hub and its subscriptions.
pub(crate) struct Shared<T> {
    pub(crate) log: EventLog<T>,
    subscriptions: RwLock<HashMap<SubscriptionId, Registered>>,
    next_id: AtomicU64,
}

impl<T> Shared<T> {
    /// Ring every doorbell.
    ///
    /// A full doorbell is already pending. A disconnected one belongs to a
    /// handle that is mid-drop and deregisters itself.
    fn notify(&self) {
        let subs = self.subscriptions.read();
        for sub in subs.values() {
            let _ = sub.doorbell.try_send(());
        }
    }

    /// Deregister and deactivate a subscription. Unknown ids are ignored.
    pub(crate) fn cancel(&self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.write().remove(&id);
        match removed {
            Some(sub) => {
                // Deactivate before the doorbell drops so a woken reader sees it.
                sub.slot.deactivate();
                drop(sub);
                debug!(subscription = %id, "subscription cancelled");
                true
            }
            None => false,
        }
    }

    /// Drop every doorbell so blocked readers wake up and observe the
    /// closed log.
    fn release_all(&self) -> usize {
        let released: Vec<_> = self.subscriptions.write().drain().collect();
        released.len()
    }

    /// Fatal resource failure: close the log and wake every reader.
    pub(crate) fn exhaust(&self, reason: String) -> HubError {
        if self.log.exhaust(reason.clone()) {
            self.release_exhausted(&reason);
        }
        HubError::Exhausted(reason)
    }

    /// Runs once, for whichever call closed the log as exhausted.
    fn release_exhausted(&self, reason: &str) {
        error!(%reason, "broadcast hub exhausted");
        self.release_all();
    }
}

/// Append-only, in-memory event hub with replay for late subscribers.
///
/// Every appended event is delivered in order to every subscription that
/// is active at append time or created later. Replay and live delivery are
/// the same read path: a subscription reads the shared log at its cursor,
/// so there is neither a gap nor a duplicate at the replay/live boundary.
///
/// The hub is cheap to clone; clones share the same log.
pub struct BroadcastHub<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BroadcastHub<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for BroadcastHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BroadcastHub<T> {
    /// Create a hub with default configuration.
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                log: EventLog::new(&config),
                subscriptions: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Append an event and wake every subscription.
    ///
    /// Never waits on subscribers. Fails only once the hub is closed or
    /// exhausted; exhaustion is fatal and closes the hub for good.
    pub fn append(&self, payload: T) -> HubResult<Sequence> {
        let event = match self.shared.log.try_append(payload) {
            Ok(event) => event,
            Err(AppendError::Exhausted(reason)) => {
                self.shared.release_exhausted(&reason);
                return Err(HubError::Exhausted(reason));
            }
            Err(AppendError::Closed(err)) => return Err(err),
        };

        debug!(sequence = %event.sequence, "event appended");
        self.shared.notify();

        Ok(event.sequence)
    }

    /// Subscribe from the beginning of the log.
    pub fn subscribe(&self) -> HubResult<Subscription<T>> {
        self.subscribe_with(SubscriptionConfig::default())
    }

    /// Subscribe with an explicit start position.
    pub fn subscribe_with(&self, config: SubscriptionConfig) -> HubResult<Subscription<T>> {
        // Reading the head takes the log lock, so a live start can neither
        // skip nor repeat a concurrent append.
        let cursor = match config.start {
            StartPosition::Beginning => Sequence(0),
            StartPosition::Live => self.shared.log.head(),
            StartPosition::After(seq) => seq.min(self.shared.log.head()),
        };

        let id = SubscriptionId(self.shared.next_id.fetch_add(1, Ordering::SeqCst));
        let (doorbell, wakeups) = bounded(1);
        let slot = Arc::new(CursorSlot::new(cursor));

        {
            let mut subs = self.shared.subscriptions.write();
            // Closing happens before the registry is drained, so a check
            // under the registry lock cannot race past the drain.
            if let Some(err) = self.shared.log.closed_error() {
                return Err(err);
            }
            if subs.try_reserve(1).is_err() {
                drop(subs);
                let reason = "cannot register another subscription".to_string();
                return Err(self.shared.exhaust(reason));
            }
            subs.insert(
                id,
                Registered {
                    slot: Arc::clone(&slot),
                    doorbell,
                },
            );
        }

        debug!(subscription = %id, cursor = %cursor, "subscription registered");
        Ok(Subscription::new(id, slot, Arc::clone(&self.shared), wakeups))
    }

    /// Cancel a subscription by id. Idempotent.
    pub fn cancel(&self, id: SubscriptionId) {
        self.shared.cancel(id);
    }

    /// Stop accepting appends and subscriptions. Existing subscriptions
    /// drain what is already in the log, then end. Idempotent.
    pub fn shutdown(&self) {
        if self.shared.log.close() {
            let released = self.shared.release_all();
            info!(
                events = self.shared.log.len(),
                subscriptions = released,
                "broadcast hub shut down"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.log.closed_error().is_some()
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.shared.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.log.is_empty()
    }

    /// Sequence of the last appended event.
    pub fn head(&self) -> Sequence {
        self.shared.log.head()
    }

    /// Number of registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.shared.subscriptions.read().len()
    }

    /// Snapshot of the events after `sequence`.
    pub fn events_after(&self, sequence: Sequence) -> Vec<Arc<Event<T>>> {
        self.shared.log.events_after(sequence)
    }
}
