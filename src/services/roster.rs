//! Roster editing service.
//!
//! Every write that introduces or changes an identity goes through
//! [`identity::ensure_available`], which keeps stored identities
//! prefix-free.

use crate::models::{Anniversary, Person, PersonId};
use crate::services::identity;
use crate::storage::RosterStore;
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Request to add a person.
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    /// Explicit identity; a fresh UUID is generated when `None`.
    pub identity: Option<String>,
    /// Display name (required).
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: String,
    /// Labels.
    pub labels: BTreeSet<String>,
}

/// Field changes for an existing person. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PersonEdit {
    /// New identity.
    pub identity: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<String>,
    /// New label set.
    pub labels: Option<BTreeSet<String>>,
}

/// Service for editing people in a roster store.
pub struct RosterService<'a, S: RosterStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: RosterStore + ?Sized> RosterService<'a, S> {
    /// Creates a roster service over `store`.
    pub const fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Resolves an identity prefix to exactly one person.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or [`Error::AmbiguousIdentity`].
    pub fn resolve(&self, prefix: &str) -> Result<&Person> {
        identity::resolve(&*self.store, prefix)
    }

    /// Adds a person and returns the identity it was stored under.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty or a label is empty
    /// - The identity is malformed or conflicts with a stored identity
    /// - Storage fails
    pub fn add_person(&mut self, request: NewPerson) -> Result<PersonId> {
        if request.name.trim().is_empty() {
            return Err(Error::InvalidInput("Name cannot be empty".to_string()));
        }

        let identity = match request.identity.as_deref() {
            Some(candidate) => identity::ensure_available(&*self.store, candidate, None)?,
            None => self.fresh_identity(),
        };

        let person = Person {
            identity: identity.clone(),
            name: request.name,
            phone: request.phone,
            email: request.email,
            role: request.role,
            labels: request.labels,
            anniversaries: Vec::new(),
        };
        person.check_labels()?;
        self.store.insert(person)?;

        tracing::info!(identity = %identity, "Added person");
        Ok(identity)
    }

    /// Applies field changes to the person `prefix` resolves to.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix does not resolve, a new identity is
    /// malformed or conflicts with another person, or the new name is empty.
    pub fn edit_person(&mut self, prefix: &str, edit: PersonEdit) -> Result<PersonId> {
        let current = self.resolve(prefix)?.clone();
        let mut updated = current.clone();

        if let Some(candidate) = edit.identity.as_deref() {
            updated.identity =
                identity::ensure_available(&*self.store, candidate, Some(&current.identity))?;
        }
        if let Some(name) = edit.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("Name cannot be empty".to_string()));
            }
            updated.name = name;
        }
        if let Some(phone) = edit.phone {
            updated.phone = phone;
        }
        if let Some(email) = edit.email {
            updated.email = email;
        }
        if let Some(role) = edit.role {
            updated.role = role;
        }
        if let Some(labels) = edit.labels {
            updated.labels = labels;
        }

        updated.check_labels()?;
        let identity = updated.identity.clone();
        self.store.replace(&current.identity, updated)?;

        tracing::info!(from = %current.identity, to = %identity, "Edited person");
        Ok(identity)
    }

    /// Removes the person `prefix` resolves to.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix does not resolve.
    pub fn delete_person(&mut self, prefix: &str) -> Result<Person> {
        let identity = self.resolve(prefix)?.identity.clone();
        let removed = self.store.remove(&identity)?;
        tracing::info!(identity = %identity, "Deleted person");
        Ok(removed)
    }

    /// Adds an anniversary to the person `prefix` resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the person already has a
    /// field-identical anniversary or a label has no name, or an error if the
    /// prefix does not resolve.
    pub fn add_anniversary(&mut self, prefix: &str, anniversary: Anniversary) -> Result<()> {
        anniversary.check_labels()?;
        let person = self.resolve(prefix)?;
        if person.anniversaries.contains(&anniversary) {
            return Err(Error::InvalidInput(format!(
                "{} already has anniversary '{}' on {}",
                person.describe(),
                anniversary.name,
                anniversary.date
            )));
        }

        let identity = person.identity.clone();
        let mut anniversaries = person.anniversaries.clone();
        anniversaries.push(anniversary);
        self.store.mutate_anniversaries_of(&identity, anniversaries)
    }

    /// Removes the anniversary at `index` from the person `prefix` resolves
    /// to, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the index is out of range, or an error
    /// if the prefix does not resolve.
    pub fn remove_anniversary(&mut self, prefix: &str, index: usize) -> Result<Anniversary> {
        let person = self.resolve(prefix)?;
        if index >= person.anniversaries.len() {
            return Err(Error::NotFound(format!(
                "{} has no anniversary #{index}",
                person.describe()
            )));
        }

        let identity = person.identity.clone();
        let mut anniversaries = person.anniversaries.clone();
        let removed = anniversaries.remove(index);
        self.store.mutate_anniversaries_of(&identity, anniversaries)?;
        Ok(removed)
    }

    fn fresh_identity(&self) -> PersonId {
        // A UUID collision by prefix is practically impossible; retry anyway.
        loop {
            let candidate = PersonId::generate();
            if !identity::has_conflict(&*self.store, candidate.as_str(), None) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRoster;
    use chrono::NaiveDate;

    fn store() -> InMemoryRoster {
        InMemoryRoster::from_persons(vec![
            Person::new("abc123", "Jane"),
            Person::new("abd456", "John"),
        ])
    }

    fn named(identity: Option<&str>, name: &str) -> NewPerson {
        NewPerson {
            identity: identity.map(str::to_string),
            name: name.to_string(),
            ..NewPerson::default()
        }
    }

    #[test]
    fn test_add_person_generates_identity() {
        let mut store = store();
        let id = RosterService::new(&mut store)
            .add_person(named(None, "Ann"))
            .unwrap();
        assert!(id.is_valid());
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_add_person_rejects_prefix_conflict() {
        let mut store = store();
        let mut service = RosterService::new(&mut store);
        assert!(matches!(
            service.add_person(named(Some("abc"), "Ann")),
            Err(Error::AmbiguousIdentity { .. })
        ));
        assert!(matches!(
            service.add_person(named(Some("abc123-x"), "Ann")),
            Err(Error::AmbiguousIdentity { .. })
        ));
        assert!(matches!(
            service.add_person(named(Some("x"), " ")),
            Err(Error::InvalidInput(_))
        ));
        assert!(service.add_person(named(Some("abe"), "Ann")).is_ok());
    }

    #[test]
    fn test_add_rejects_empty_labels() {
        let mut store = store();
        let mut service = RosterService::new(&mut store);

        let mut request = named(Some("x1"), "Ann");
        request.labels.insert(String::new());
        assert!(matches!(service.add_person(request), Err(Error::InvalidInput(_))));

        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let unnamed = Anniversary::new(date, "Joined").with_type("", "note");
        assert!(matches!(
            service.add_anniversary("abc", unnamed),
            Err(Error::InvalidInput(_))
        ));
        assert!(service.resolve("abc").unwrap().anniversaries.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_edit_person_keeps_own_identity() {
        let mut store = store();
        let mut service = RosterService::new(&mut store);

        let edit = PersonEdit {
            identity: Some("abc123".to_string()),
            email: Some("jane@x.com".to_string()),
            ..PersonEdit::default()
        };
        service.edit_person("abc", edit).unwrap();
        assert_eq!(service.resolve("abc").unwrap().email, "jane@x.com");

        let clash = PersonEdit {
            identity: Some("abd".to_string()),
            ..PersonEdit::default()
        };
        assert!(matches!(
            service.edit_person("abc", clash),
            Err(Error::AmbiguousIdentity { .. })
        ));
    }

    #[test]
    fn test_edit_person_renames_identity() {
        let mut store = store();
        let edit = PersonEdit {
            identity: Some("jane".to_string()),
            ..PersonEdit::default()
        };
        let id = RosterService::new(&mut store).edit_person("abc", edit).unwrap();
        assert_eq!(id, PersonId::new("jane"));
        assert_eq!(store.persons()[0].identity, id);
    }

    #[test]
    fn test_delete_person_requires_unique_prefix() {
        let mut store = store();
        let mut service = RosterService::new(&mut store);
        assert!(matches!(
            service.delete_person("ab"),
            Err(Error::AmbiguousIdentity { .. })
        ));
        assert_eq!(service.delete_person("abd").unwrap().name, "John");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_anniversary_add_and_remove() {
        let date = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
        let mut store = store();
        let mut service = RosterService::new(&mut store);

        service
            .add_anniversary("abc", Anniversary::new(date, "Joined"))
            .unwrap();
        assert!(matches!(
            service.add_anniversary("abc", Anniversary::new(date, "Joined")),
            Err(Error::InvalidInput(_))
        ));
        service
            .add_anniversary("abc", Anniversary::new(date, "Promoted"))
            .unwrap();

        let removed = service.remove_anniversary("abc", 0).unwrap();
        assert_eq!(removed.name, "Joined");
        assert!(matches!(
            service.remove_anniversary("abc", 5),
            Err(Error::NotFound(_))
        ));
        assert_eq!(store.persons()[0].anniversaries.len(), 1);
    }
}
