//! Contact service: the write path and the caller-facing operations.

use crate::dto::{CompanyRecord, ContactRecord};
use crate::error::{NotFound, Result};
use crate::hub::{BroadcastHub, Subscription};
use crate::records::RecordStore;
use crate::validation::validate_contact;
use tracing::{info, warn};

/// Company/contact operations plus contact-update notifications.
///
/// Every successful [`save_contact`](Self::save_contact) appends exactly one
/// event carrying the saved contact to the injected hub; a failed save
/// appends nothing.
pub struct CrmService<S> {
    store: S,
    hub: BroadcastHub<ContactRecord>,
}

impl<S: RecordStore> CrmService<S> {
    pub fn new(store: S, hub: BroadcastHub<ContactRecord>) -> Self {
        Self { store, hub }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hub(&self) -> &BroadcastHub<ContactRecord> {
        &self.hub
    }

    pub fn list_companies(&self) -> Result<Vec<CompanyRecord>> {
        let companies = self.store.list_companies()?;
        Ok(companies.iter().map(CompanyRecord::from).collect())
    }

    pub fn list_contacts(&self) -> Result<Vec<ContactRecord>> {
        let contacts = self.store.list_contacts()?;
        Ok(contacts
            .iter()
            .map(|(contact, company)| ContactRecord::from_parts(contact, company))
            .collect())
    }

    /// Update a contact's names, email and company, then notify subscribers.
    ///
    /// Validation, lookup and persistence failures are returned before the
    /// hub is touched. A hub failure after a successful write is fatal
    /// (see [`ServiceError::is_fatal`](crate::ServiceError::is_fatal)).
    pub fn save_contact(&self, record: ContactRecord) -> Result<ContactRecord> {
        let contact_id = validate_contact(&record).map_err(|e| {
            warn!(field = e.field, "rejected contact change: {}", e.message);
            e
        })?;

        let mut contact = self
            .store
            .find_contact(contact_id)?
            .ok_or(NotFound::Contact(contact_id))?;
        let company = self
            .store
            .find_company(record.company.id)?
            .ok_or(NotFound::Company(record.company.id))?;

        contact.first_name = record.first_name;
        contact.last_name = record.last_name;
        contact.email = record.email;
        contact.company_id = company.id;

        let saved = self.store.save_contact(contact).map_err(|e| {
            warn!(contact = %contact_id, error = %e, "failed to persist contact");
            e
        })?;

        let snapshot = ContactRecord::from_parts(&saved, &company);
        let sequence = self.hub.append(snapshot.clone())?;
        info!(contact = %saved.id, sequence = %sequence, "contact saved");

        Ok(snapshot)
    }

    /// Every contact update so far, followed by live ones.
    pub fn subscribe_to_contact_updates(&self) -> Result<Subscription<ContactRecord>> {
        Ok(self.hub.subscribe()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::records::InMemoryRecordStore;
    use crate::types::{CompanyId, NewContact};

    fn service() -> (CrmService<InMemoryRecordStore>, ContactRecord) {
        let store = InMemoryRecordStore::new();
        let acme = store.insert_company("Acme");
        store.insert_company("Globex");
        let contact = store
            .insert_contact(NewContact::new("Ada", "Lovelace", "ada@acme.io", acme.id))
            .unwrap();

        let record = ContactRecord::from_parts(&contact, &acme);
        (CrmService::new(store, BroadcastHub::new()), record)
    }

    #[test]
    fn test_save_moves_contact_and_publishes() {
        let (service, mut record) = service();
        record.email = "ada@globex.io".into();
        record.company = CompanyRecord {
            id: CompanyId(2),
            name: String::new(),
        };

        let saved = service.save_contact(record).unwrap();
        assert_eq!(saved.company.name, "Globex");
        assert_eq!(service.hub().len(), 1);

        let updates = service.subscribe_to_contact_updates().unwrap();
        assert_eq!(updates.try_recv().unwrap().payload, saved);
        assert_eq!(service.list_contacts().unwrap(), vec![saved]);
    }

    #[test]
    fn test_unknown_company_publishes_nothing() {
        let (service, mut record) = service();
        record.company.id = CompanyId(77);

        let err = service.save_contact(record).unwrap_err();
        assert_eq!(err, ServiceError::NotFound(NotFound::Company(CompanyId(77))));
        assert!(service.hub().is_empty());
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let (service, mut record) = service();
        record.email = "not-an-email".into();

        assert!(matches!(
            service.save_contact(record),
            Err(ServiceError::Validation(_))
        ));
        assert!(service.hub().is_empty());
    }

    #[test]
    fn test_list_companies() {
        let (service, _) = service();
        let names: Vec<_> = service
            .list_companies()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Acme", "Globex"]);
    }
}
