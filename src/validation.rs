//! Field validation for contact changes.

use crate::dto::ContactRecord;
use crate::error::ValidationError;
use crate::types::ContactId;

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Check a contact change before it touches the store and return the id of
/// the contact to update. Reports the first violation found.
pub fn validate_contact(record: &ContactRecord) -> Result<ContactId, ValidationError> {
    let id = record
        .id
        .ok_or_else(|| ValidationError::new("id", "contact id is required"))?;
    validate_name("firstName", &record.first_name)?;
    validate_name("lastName", &record.last_name)?;
    validate_email(&record.email)?;
    Ok(id)
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

/// Syntactic check only: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = |message: &str| Err(ValidationError::new("email", message));

    if email.trim().is_empty() {
        return invalid("must not be empty");
    }
    if email.chars().any(char::is_whitespace) {
        return invalid("must not contain whitespace");
    }

    let Some((local, domain)) = email.split_once('@') else {
        return invalid("missing '@'");
    };
    if local.is_empty() || domain.contains('@') {
        return invalid("invalid address");
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return invalid("invalid domain");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CompanyRecord;
    use crate::types::CompanyId;

    fn record(first: &str, last: &str, email: &str) -> ContactRecord {
        ContactRecord {
            id: Some(ContactId(1)),
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            company: CompanyRecord {
                id: CompanyId(1),
                name: String::new(),
            },
        }
    }

    #[test]
    fn test_valid_contact() {
        let id = validate_contact(&record("Ada", "Lovelace", "ada@acme.io")).unwrap();
        assert_eq!(id, ContactId(1));
    }

    #[test]
    fn test_missing_id() {
        let mut r = record("Ada", "Lovelace", "ada@acme.io");
        r.id = None;
        assert_eq!(validate_contact(&r).unwrap_err().field, "id");
    }

    #[test]
    fn test_name_bounds() {
        let err = validate_contact(&record("  ", "Lovelace", "ada@acme.io")).unwrap_err();
        assert_eq!(err.field, "firstName");

        let exact = "x".repeat(MAX_NAME_LEN);
        assert!(validate_contact(&record(&exact, "L", "a@b.io")).is_ok());

        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_contact(&record("Ada", &long, "a@b.io")).unwrap_err();
        assert_eq!(err.field, "lastName");
    }

    #[test]
    fn test_name_length_counts_characters() {
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(validate_contact(&record(&name, "L", "a@b.io")).is_ok());
    }

    #[test]
    fn test_email_syntax() {
        let bad_emails = [
            "", "ada", "@acme.io", "ada@", "ada@acme", "ada@.io", "ada@acme.", "a b@c.io",
            "a@b@c.io",
        ];
        for bad in bad_emails {
            assert!(validate_email(bad).is_err(), "accepted {bad:?}");
        }
        for good in ["ada@acme.io", "first.last+tag@mail.example.org"] {
            assert!(validate_email(good).is_ok(), "rejected {good:?}");
        }
    }
}
