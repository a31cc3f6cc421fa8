//! Company and contact storage.
//!
//! `RecordStore` is the boundary to whatever actually persists records;
//! `InMemoryRecordStore` is a process-local implementation.

mod memory;
mod store;

pub use memory::InMemoryRecordStore;
pub use store::RecordStore;
