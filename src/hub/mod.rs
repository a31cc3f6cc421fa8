//! Change-notification hub.
//!
//! An append-only, in-memory event log fanned out to any number of
//! subscriptions:
//! - Every event gets a gapless, increasing sequence number
//! - New subscriptions replay the whole log before live events
//! - Appends never wait on subscribers; a slow reader simply lags behind
//!   its cursor and catches up from the log
//!
//! # Example
//!
//! ```ignore
//! let hub = BroadcastHub::new();
//! hub.append("created")?;
//!
//! let subscription = hub.subscribe()?;
//! hub.append("updated")?;
//!
//! // Replays "created", then sees "updated"
//! while let Some(event) = subscription.recv() {
//!     println!("{:?}: {}", event.sequence, event.payload);
//! }
//! ```

mod broadcast;
mod log;
mod subscription;
mod types;

pub use broadcast::BroadcastHub;
pub use log::EventLog;
pub use subscription::{Delivery, Subscription};
pub use types::{Event, HubConfig, StartPosition, SubscriptionConfig, SubscriptionId};
