//! Identity prefix matching.
//!
//! Any unambiguous prefix of an identity refers to that person. That only
//! works while no stored identity is a prefix of another, so every write
//! that introduces an identity checks [`has_conflict`] first.

use crate::models::{Person, PersonId, identities_conflict};
use crate::storage::RosterStore;
use crate::{Error, Result};

/// Returns every stored person whose identity conflicts with `prefix`.
#[must_use]
pub fn find_by_prefix<'a, S>(store: &'a S, prefix: &str) -> Vec<&'a Person>
where
    S: RosterStore + ?Sized,
{
    store.lookup_by_identity_prefix(prefix)
}

/// Resolves a prefix to exactly one person.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when nothing matches and
/// [`Error::AmbiguousIdentity`] when more than one person matches.
pub fn resolve<'a, S>(store: &'a S, prefix: &str) -> Result<&'a Person>
where
    S: RosterStore + ?Sized,
{
    let matches = find_by_prefix(store, prefix);
    match matches.as_slice() {
        [] => Err(Error::NotFound(format!(
            "no person matches identity '{prefix}'"
        ))),
        [person] => Ok(*person),
        many => Err(Error::AmbiguousIdentity {
            identity: prefix.to_string(),
            matches: many.iter().map(|p| p.identity.to_string()).collect(),
        }),
    }
}

/// Returns the stored identities that conflict with `candidate`, leaving out
/// `ignoring` (the record being edited).
#[must_use]
pub fn conflicting_identities<S>(
    store: &S,
    candidate: &str,
    ignoring: Option<&PersonId>,
) -> Vec<PersonId>
where
    S: RosterStore + ?Sized,
{
    find_by_prefix(store, candidate)
        .into_iter()
        .filter(|p| Some(&p.identity) != ignoring)
        .map(|p| p.identity.clone())
        .collect()
}

/// Returns whether writing `candidate` would make prefix lookups ambiguous.
#[must_use]
pub fn has_conflict<S>(store: &S, candidate: &str, ignoring: Option<&PersonId>) -> bool
where
    S: RosterStore + ?Sized,
{
    !conflicting_identities(store, candidate, ignoring).is_empty()
}

/// Checks that `candidate` is a well-formed identity that conflicts with no
/// stored identity other than `ignoring`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a malformed identity and
/// [`Error::AmbiguousIdentity`] for a prefix conflict.
pub fn ensure_available<S>(
    store: &S,
    candidate: &str,
    ignoring: Option<&PersonId>,
) -> Result<PersonId>
where
    S: RosterStore + ?Sized,
{
    let identity = PersonId::parse(candidate)?;
    let conflicts = conflicting_identities(store, candidate, ignoring);
    if conflicts.is_empty() {
        Ok(identity)
    } else {
        Err(Error::AmbiguousIdentity {
            identity: candidate.to_string(),
            matches: conflicts.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Finds a pair of conflicting identities within a batch, if any.
///
/// After sorting, any identity that is a prefix of a later one is also a
/// prefix of its immediate successor, so comparing neighbours is enough.
#[must_use]
pub fn first_batch_conflict(persons: &[Person]) -> Option<(PersonId, PersonId)> {
    let mut identities: Vec<&PersonId> = persons.iter().map(|p| &p.identity).collect();
    identities.sort();
    identities
        .windows(2)
        .find(|pair| identities_conflict(pair[0].as_str(), pair[1].as_str()))
        .map(|pair| (pair[0].clone(), pair[1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRoster;

    fn store() -> InMemoryRoster {
        InMemoryRoster::from_persons(vec![
            Person::new("abc123", "Jane"),
            Person::new("abd456", "John"),
            Person::new("f00", "Ann"),
        ])
    }

    #[test]
    fn test_resolve_unique_prefix() {
        let store = store();
        assert_eq!(resolve(&store, "abc").unwrap().name, "Jane");
        assert_eq!(resolve(&store, "abc123").unwrap().name, "Jane");
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let store = store();
        match resolve(&store, "ab") {
            Err(Error::AmbiguousIdentity { matches, .. }) => {
                assert_eq!(matches, vec!["abc123", "abd456"]);
            },
            other => unreachable!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_not_found() {
        assert!(matches!(resolve(&store(), "zz"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_has_conflict_both_directions() {
        let store = store();
        assert!(has_conflict(&store, "abc", None));
        assert!(has_conflict(&store, "f00-extended", None));
        assert!(has_conflict(&store, "abc123", None));
        assert!(!has_conflict(&store, "abe", None));
    }

    #[test]
    fn test_has_conflict_ignoring_self() {
        let store = store();
        let jane = PersonId::new("abc123");
        assert!(!has_conflict(&store, "abc123", Some(&jane)));
        assert!(has_conflict(&store, "ab", Some(&jane)));
    }

    #[test]
    fn test_ensure_available() {
        let store = store();
        assert!(ensure_available(&store, "xyz", None).is_ok());
        assert!(matches!(
            ensure_available(&store, "abc", None),
            Err(Error::AmbiguousIdentity { .. })
        ));
        assert!(matches!(
            ensure_available(&store, "bad id", None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_first_batch_conflict() {
        let clean = vec![Person::new("abc", "A"), Person::new("abd", "B")];
        assert!(first_batch_conflict(&clean).is_none());

        let prefixed = vec![
            Person::new("abc123", "A"),
            Person::new("abd", "B"),
            Person::new("abc", "C"),
        ];
        assert_eq!(
            first_batch_conflict(&prefixed),
            Some((PersonId::new("abc"), PersonId::new("abc123")))
        );

        let equal = vec![Person::new("x", "A"), Person::new("x", "B")];
        assert!(first_batch_conflict(&equal).is_some());
    }
}
