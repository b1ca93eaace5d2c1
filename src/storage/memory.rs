//! In-memory roster store.
//!
//! The only store implementation; the CLI loads it from and saves it to a
//! structured-format file (see [`super::file`]).

use crate::models::{Anniversary, Person, PersonId};
use crate::storage::traits::RosterStore;
use crate::{Error, Result};

/// Vector-backed roster store preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRoster {
    persons: Vec<Person>,
}

impl InMemoryRoster {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given people without any checks.
    ///
    /// Used when loading a previously saved roster.
    #[must_use]
    pub const fn from_persons(persons: Vec<Person>) -> Self {
        Self { persons }
    }

    /// Consumes the store and returns its people.
    #[must_use]
    pub fn into_persons(self) -> Vec<Person> {
        self.persons
    }

    fn position(&self, identity: &PersonId) -> Result<usize> {
        self.persons
            .iter()
            .position(|p| &p.identity == identity)
            .ok_or_else(|| Error::NotFound(format!("no person with identity '{identity}'")))
    }
}

impl RosterStore for InMemoryRoster {
    fn persons(&self) -> &[Person] {
        &self.persons
    }

    fn insert(&mut self, person: Person) -> Result<()> {
        if self.get(&person.identity).is_some() {
            return Err(Error::AmbiguousIdentity {
                identity: person.identity.to_string(),
                matches: vec![person.identity.to_string()],
            });
        }
        tracing::debug!(identity = %person.identity, "Inserted person");
        self.persons.push(person);
        Ok(())
    }

    fn replace_all(&mut self, persons: Vec<Person>) -> Result<()> {
        tracing::debug!(
            previous = self.persons.len(),
            replacement = persons.len(),
            "Replaced roster"
        );
        self.persons = persons;
        Ok(())
    }

    fn mutate_anniversaries_of(
        &mut self,
        identity: &PersonId,
        anniversaries: Vec<Anniversary>,
    ) -> Result<()> {
        let idx = self.position(identity)?;
        tracing::debug!(
            identity = %identity,
            count = anniversaries.len(),
            "Replaced anniversaries"
        );
        self.persons[idx].anniversaries = anniversaries;
        Ok(())
    }

    fn replace(&mut self, identity: &PersonId, person: Person) -> Result<()> {
        let idx = self.position(identity)?;
        self.persons[idx] = person;
        Ok(())
    }

    fn remove(&mut self, identity: &PersonId) -> Result<Person> {
        let idx = self.position(identity)?;
        tracing::debug!(identity = %identity, "Removed person");
        Ok(self.persons.remove(idx))
    }
}
