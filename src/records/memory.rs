//! In-memory record store.

use crate::error::{RecordStoreError, StoreResult};
use crate::records::RecordStore;
use crate::types::{Company, CompanyId, Contact, ContactId, NewContact};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Record store backed by ordered maps. Listings are ordered by id.
pub struct InMemoryRecordStore {
    companies: RwLock<BTreeMap<CompanyId, Company>>,
    contacts: RwLock<BTreeMap<ContactId, Contact>>,
    next_company_id: AtomicU64,
    next_contact_id: AtomicU64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            companies: RwLock::new(BTreeMap::new()),
            contacts: RwLock::new(BTreeMap::new()),
            next_company_id: AtomicU64::new(1),
            next_contact_id: AtomicU64::new(1),
        }
    }

    /// Add a company, assigning its id.
    pub fn insert_company(&self, name: impl Into<String>) -> Company {
        let id = CompanyId(self.next_company_id.fetch_add(1, Ordering::SeqCst));
        let company = Company {
            id,
            name: name.into(),
        };
        self.companies.write().insert(id, company.clone());
        company
    }

    /// Add a contact, assigning its id. The company must exist.
    pub fn insert_contact(&self, input: NewContact) -> StoreResult<Contact> {
        if !self.companies.read().contains_key(&input.company_id) {
            return Err(RecordStoreError::MissingCompany(input.company_id));
        }

        let id = ContactId(self.next_contact_id.fetch_add(1, Ordering::SeqCst));
        let contact = Contact {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            company_id: input.company_id,
        };
        self.contacts.write().insert(id, contact.clone());
        Ok(contact)
    }

    pub fn company_count(&self) -> usize {
        self.companies.read().len()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.read().len()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.companies.read().get(&id).cloned())
    }

    fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.contacts.read().get(&id).cloned())
    }

    fn save_contact(&self, contact: Contact) -> StoreResult<Contact> {
        if !self.companies.read().contains_key(&contact.company_id) {
            return Err(RecordStoreError::MissingCompany(contact.company_id));
        }

        let mut contacts = self.contacts.write();
        match contacts.get_mut(&contact.id) {
            Some(stored) => {
                *stored = contact.clone();
                Ok(contact)
            }
            None => Err(RecordStoreError::MissingContact(contact.id)),
        }
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        Ok(self.companies.read().values().cloned().collect())
    }

    fn list_contacts(&self) -> StoreResult<Vec<(Contact, Company)>> {
        let companies = self.companies.read();
        let contacts = self.contacts.read();

        contacts
            .values()
            .map(|contact| {
                companies
                    .get(&contact.company_id)
                    .map(|company| (contact.clone(), company.clone()))
                    .ok_or(RecordStoreError::MissingCompany(contact.company_id))
            })
            .collect()
    }
}
