//! Subscription handles: per-subscriber cursors into the hub's log.

use crate::error::{HubResult, RecvTimeoutError, TryRecvError};
use crate::hub::broadcast::Shared;
use crate::hub::log::LogRead;
use crate::hub::types::{Event, SubscriptionId};
use crate::types::Sequence;
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

struct CursorState {
    /// Sequence of the last event handed out.
    cursor: Sequence,
    active: bool,
}

/// Read position of one subscription.
///
/// Advancing the cursor and cancelling take the same lock, so once
/// `deactivate` returns no further event is handed out.
pub(crate) struct CursorSlot {
    state: Mutex<CursorState>,
}

impl CursorSlot {
    pub(crate) fn new(cursor: Sequence) -> Self {
        Self {
            state: Mutex::new(CursorState {
                cursor,
                active: true,
            }),
        }
    }

    pub(crate) fn deactivate(&self) {
        self.state.lock().active = false;
    }
}

enum Poll<T> {
    Ready(Arc<Event<T>>),
    Pending,
    Closed,
}

/// A live handle on the hub's event stream.
///
/// Yields every event after its cursor in sequence order: first the
/// backlog, then live events as they are appended. The stream ends when the
/// subscription is cancelled (or dropped), or when the hub is closed and
/// everything appended before closing has been read.
///
/// ```ignore
/// let hub = BroadcastHub::new();
/// hub.append("first")?;
///
/// let subscription = hub.subscribe()?;
/// for event in subscription.iter() {
///     println!("{}: {}", event.sequence, event.payload);
/// }
/// ```
pub struct Subscription<T> {
    id: SubscriptionId,
    slot: Arc<CursorSlot>,
    shared: Arc<Shared<T>>,
    wakeups: Receiver<()>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: SubscriptionId,
        slot: Arc<CursorSlot>,
        shared: Arc<Shared<T>>,
        wakeups: Receiver<()>,
    ) -> Self {
        Self {
            id,
            slot,
            shared,
            wakeups,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Sequence of the last event delivered (`Sequence(0)` before any).
    pub fn cursor(&self) -> Sequence {
        self.slot.state.lock().cursor
    }

    pub fn is_active(&self) -> bool {
        self.slot.state.lock().active
    }

    /// Stop receiving. Idempotent; events already returned are not revoked.
    pub fn cancel(&self) {
        self.slot.deactivate();
        self.shared.cancel(self.id);
    }

    fn poll(&self) -> Poll<T> {
        let mut state = self.slot.state.lock();
        if !state.active {
            return Poll::Closed;
        }

        match self.shared.log.read_after(state.cursor) {
            LogRead::Event(event) => {
                state.cursor = event.sequence;
                Poll::Ready(event)
            }
            LogRead::Pending => Poll::Pending,
            LogRead::Closed => Poll::Closed,
        }
    }

    /// Receive the next event without blocking.
    pub fn try_recv(&self) -> Result<Arc<Event<T>>, TryRecvError> {
        match self.poll() {
            Poll::Ready(event) => Ok(event),
            Poll::Pending => Err(TryRecvError::Empty),
            Poll::Closed => Err(TryRecvError::Closed),
        }
    }

    /// Receive the next event, blocking until one is appended.
    ///
    /// Returns `None` once the stream has ended.
    pub fn recv(&self) -> Option<Arc<Event<T>>> {
        loop {
            match self.poll() {
                Poll::Ready(event) => return Some(event),
                Poll::Closed => return None,
                Poll::Pending => {}
            }

            if self.wakeups.recv().is_err() {
                return self.final_poll().ok();
            }
        }
    }

    /// Receive the next event, waiting at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Arc<Event<T>>, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.poll() {
                Poll::Ready(event) => return Ok(event),
                Poll::Closed => return Err(RecvTimeoutError::Closed),
                Poll::Pending => {}
            }

            match self.wakeups.recv_deadline(deadline) {
                Ok(()) => {}
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    return Err(RecvTimeoutError::Timeout)
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    return self.final_poll();
                }
            }
        }
    }

    /// The doorbell is gone, so the hub deregistered us: either a cancel is
    /// in progress or the log is closed. Whatever is still readable was
    /// appended before that.
    fn final_poll(&self) -> Result<Arc<Event<T>>, RecvTimeoutError> {
        match self.poll() {
            Poll::Ready(event) => Ok(event),
            Poll::Pending | Poll::Closed => Err(RecvTimeoutError::Closed),
        }
    }

    /// Blocking iterator over the remaining events.
    pub fn iter(&self) -> impl Iterator<Item = Arc<Event<T>>> + '_ {
        std::iter::from_fn(move || self.recv())
    }
}

impl<T: Send + Sync + 'static> Subscription<T> {
    /// Move delivery onto a background thread that pushes every event into
    /// an unbounded channel.
    ///
    /// Dropping the returned [`Delivery`] cancels the subscription, which
    /// wakes the thread and lets it exit.
    pub fn spawn_delivery(self) -> HubResult<Delivery<T>> {
        let id = self.id;
        let shared = Arc::clone(&self.shared);
        let (sender, receiver) = unbounded();

        let handle = thread::Builder::new()
            .name(format!("hub-delivery-{}", id.0))
            .spawn(move || {
                while let Some(event) = self.recv() {
                    if sender.send(event).is_err() {
                        debug!(subscription = %id, "delivery receiver dropped");
                        break;
                    }
                }
                self.cancel();
            });

        match handle {
            Ok(handle) => Ok(Delivery {
                id,
                receiver,
                shared,
                handle: Some(handle),
            }),
            Err(e) => Err(shared.exhaust(format!("cannot spawn delivery thread: {e}"))),
        }
    }
}

impl<T> Iterator for Subscription<T> {
    type Item = Arc<Event<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A subscription pumped into a channel by a background thread.
///
/// Dropping it cancels the subscription.
pub struct Delivery<T> {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: Receiver<Arc<Event<T>>>,
    shared: Arc<Shared<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T> Delivery<T> {
    /// Stop the delivery thread. Events it already pushed stay in the
    /// channel. Idempotent.
    pub fn cancel(&self) {
        self.shared.cancel(self.id);
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<Arc<Event<T>>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<Arc<Event<T>>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Arc<Event<T>>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Wait for the delivery thread to finish. It finishes once the stream
    /// ends, so call this after cancelling or shutting down the hub.
    pub fn join(mut self) -> thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl<T> Drop for Delivery<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
