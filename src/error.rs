//! Error types for the contact hub.

use crate::types::{CompanyId, ContactId};
use thiserror::Error;

/// Errors raised by the broadcast hub.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HubError {
    /// The hub could not grow its log or registry. Fatal: the hub is closed
    /// and every later append or subscribe fails.
    #[error("Hub exhausted: {0}")]
    Exhausted(String),

    #[error("Hub is closed")]
    Closed,
}

impl HubError {
    /// Whether the error leaves the hub unusable for the rest of the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HubError::Exhausted(_))
    }
}

/// Error returned by a non-blocking receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TryRecvError {
    #[error("No event available")]
    Empty,

    #[error("Subscription closed")]
    Closed,
}

/// Error returned by a receive with timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RecvTimeoutError {
    #[error("Timed out waiting for an event")]
    Timeout,

    #[error("Subscription closed")]
    Closed,
}

/// Errors raised by a [`RecordStore`](crate::records::RecordStore).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Company does not exist: {0}")]
    MissingCompany(CompanyId),

    #[error("Contact does not exist: {0}")]
    MissingContact(ContactId),
}

/// A field that failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A referenced entity that does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("Contact not found: {0}")]
    Contact(ContactId),

    #[error("Company not found: {0}")]
    Company(CompanyId),
}

/// Errors returned to callers of the service.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("Persistence error: {0}")]
    Persistence(#[from] RecordStoreError),

    #[error("Notification hub error: {0}")]
    Hub(#[from] HubError),
}

impl ServiceError {
    /// Fatal errors must be surfaced to the hosting process rather than
    /// handled per request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Hub(e) if e.is_fatal())
    }
}

/// Result type for hub operations.
pub type HubResult<T> = std::result::Result<T, HubError>;

/// Result type for record store operations.
pub type StoreResult<T> = std::result::Result<T, RecordStoreError>;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
