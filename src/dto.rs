//! Wire shapes exposed to callers, decoupled from the stored entities.

use crate::types::{Company, CompanyId, Contact, ContactId};
use serde::{Deserialize, Serialize};

/// `{id, name}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    #[serde(default)]
    pub name: String,
}

impl From<&Company> for CompanyRecord {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
        }
    }
}

/// `{id, firstName, lastName, email, company: {id, name}}`
///
/// Also the payload of every contact-update event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Absent for contacts that were never stored.
    pub id: Option<ContactId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: CompanyRecord,
}

impl ContactRecord {
    /// Snapshot of a stored contact joined with its company.
    pub fn from_parts(contact: &Contact, company: &Company) -> Self {
        Self {
            id: Some(contact.id),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            company: CompanyRecord::from(company),
        }
    }
}
