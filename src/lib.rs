//! # Contact Hub
//!
//! A company/contact record service with a real-time change-notification
//! hub: every contact update is appended to an ordered in-memory log and
//! delivered to every subscriber, with late subscribers replaying the full
//! history before seeing live updates.
//!
//! ## Core Concepts
//!
//! - **Records**: Companies and contacts behind the `RecordStore` boundary
//! - **Hub**: Append-only event log with replaying multicast
//! - **Subscriptions**: Per-subscriber cursors; slow readers never stall writers
//! - **Service**: Validated contact updates that publish one event each
//!
//! ## Example
//!
//! ```ignore
//! use contact_hub::{BroadcastHub, CrmService, InMemoryRecordStore, NewContact};
//!
//! let store = InMemoryRecordStore::new();
//! let acme = store.insert_company("Acme");
//! store.insert_contact(NewContact::new("Ada", "Lovelace", "ada@acme.io", acme.id))?;
//!
//! let service = CrmService::new(store, BroadcastHub::new());
//! let updates = service.subscribe_to_contact_updates()?;
//!
//! let mut contact = service.list_contacts()?.remove(0);
//! contact.email = "ada@example.org".into();
//! service.save_contact(contact)?;
//!
//! let event = updates.recv().unwrap();
//! assert_eq!(event.payload.email, "ada@example.org");
//! ```

pub mod dto;
pub mod error;
pub mod hub;
pub mod records;
pub mod service;
pub mod types;
pub mod validation;

// Re-exports
pub use dto::{CompanyRecord, ContactRecord};
pub use error::{
    HubError, NotFound, RecordStoreError, RecvTimeoutError, Result, ServiceError, TryRecvError,
    ValidationError,
};
pub use hub::{
    BroadcastHub, Delivery, Event, EventLog, HubConfig, StartPosition, Subscription,
    SubscriptionConfig, SubscriptionId,
};
pub use records::{InMemoryRecordStore, RecordStore};
pub use service::CrmService;
pub use types::*;
