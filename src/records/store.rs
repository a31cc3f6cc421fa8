//! Record store contract.

use crate::error::StoreResult;
use crate::types::{Company, CompanyId, Contact, ContactId};
use std::sync::Arc;

/// Storage and lookup of companies and contacts.
///
/// Lookups return `Ok(None)` for an absent id; `Err` is reserved for storage
/// failures.
pub trait RecordStore: Send + Sync {
    fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>>;

    fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>>;

    /// Persist a contact and return the stored state.
    fn save_contact(&self, contact: Contact) -> StoreResult<Contact>;

    fn list_companies(&self) -> StoreResult<Vec<Company>>;

    /// Every contact joined with its company.
    fn list_contacts(&self) -> StoreResult<Vec<(Contact, Company)>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        (**self).find_company(id)
    }

    fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        (**self).find_contact(id)
    }

    fn save_contact(&self, contact: Contact) -> StoreResult<Contact> {
        (**self).save_contact(contact)
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        (**self).list_companies()
    }

    fn list_contacts(&self) -> StoreResult<Vec<(Contact, Company)>> {
        (**self).list_contacts()
    }
}
