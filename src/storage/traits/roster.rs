//! Roster store trait.

use crate::Result;
use crate::models::{Anniversary, Person, PersonId, identities_conflict};

/// Authoritative collection of people.
///
/// Stores are single-writer: callers hold `&mut` for the duration of a
/// mutation and no locking happens here. Insertion order is preserved and is
/// the order [`RosterStore::persons`] reports.
pub trait RosterStore {
    /// Returns every stored person in insertion order.
    fn persons(&self) -> &[Person];

    /// Inserts a new person.
    ///
    /// # Errors
    ///
    /// Returns an error if a person with an equal identity is already stored.
    fn insert(&mut self, person: Person) -> Result<()>;

    /// Replaces the whole collection in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement cannot be applied; the previous
    /// collection is then left untouched.
    fn replace_all(&mut self, persons: Vec<Person>) -> Result<()>;

    /// Replaces the anniversaries of the person with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no person has that identity.
    fn mutate_anniversaries_of(
        &mut self,
        identity: &PersonId,
        anniversaries: Vec<Anniversary>,
    ) -> Result<()>;

    /// Replaces the record of the person with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no person has that identity.
    fn replace(&mut self, identity: &PersonId, person: Person) -> Result<()>;

    /// Removes and returns the person with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no person has that identity.
    fn remove(&mut self, identity: &PersonId) -> Result<Person>;

    /// Returns every person whose identity is a prefix of `prefix` or has
    /// `prefix` as a prefix.
    fn lookup_by_identity_prefix(&self, prefix: &str) -> Vec<&Person> {
        self.persons()
            .iter()
            .filter(|p| identities_conflict(p.identity.as_str(), prefix))
            .collect()
    }

    /// Returns the person with exactly this identity.
    fn get(&self, identity: &PersonId) -> Option<&Person> {
        self.persons().iter().find(|p| &p.identity == identity)
    }

    /// Returns the number of stored people.
    fn len(&self) -> usize {
        self.persons().len()
    }

    /// Returns whether the store is empty.
    fn is_empty(&self) -> bool {
        self.persons().is_empty()
    }
}
