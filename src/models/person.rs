//! Person records and their identities.

use super::anniversary::{Anniversary, dedup_anniversaries};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// Longest identity accepted (the length of a hyphenated UUID).
pub const IDENTITY_MAX_LEN: usize = 36;

static IDENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,36}$").unwrap_or_else(|_| unreachable!()));

/// Identity string of a person.
///
/// Identities double as short-hand references: any unambiguous prefix of an
/// identity selects that person. Construction through [`PersonId::new`] does
/// not validate, since imported data has to be classified before it can be
/// rejected; use [`PersonId::parse`] at write time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Creates an identity without validating it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the identity is empty, longer than
    /// [`IDENTITY_MAX_LEN`], or contains characters other than ASCII letters,
    /// digits and `-`.
    pub fn parse(id: &str) -> Result<Self> {
        if Self::is_valid_str(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(Error::InvalidInput(format!(
                "identity '{id}' must be 1-{IDENTITY_MAX_LEN} characters of [A-Za-z0-9-]"
            )))
        }
    }

    /// Generates a fresh identity (a hyphenated UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns whether this identity is within the allowed alphabet and length.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::is_valid_str(&self.0)
    }

    fn is_valid_str(id: &str) -> bool {
        IDENTITY_PATTERN.is_match(id)
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Returns whether two identities conflict: one is a prefix of the other.
///
/// Equal identities conflict in both directions.
#[must_use]
pub fn identities_conflict(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable identity, assigned once.
    pub identity: PersonId,
    /// Display name.
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Role or position.
    #[serde(default)]
    pub role: String,
    /// Free-text labels.
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Anniversaries, in insertion order, with no two field-identical.
    #[serde(default)]
    pub anniversaries: Vec<Anniversary>,
}

impl Person {
    /// Creates a person with no contact fields, labels or anniversaries.
    #[must_use]
    pub fn new(identity: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
            phone: String::new(),
            email: String::new(),
            role: String::new(),
            labels: BTreeSet::new(),
            anniversaries: Vec::new(),
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Replaces the anniversaries, dropping field-identical duplicates.
    #[must_use]
    pub fn with_anniversaries(mut self, anniversaries: Vec<Anniversary>) -> Self {
        self.anniversaries = dedup_anniversaries(anniversaries);
        self
    }

    /// Compares every field except the anniversaries.
    #[must_use]
    pub fn same_record(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.name == other.name
            && self.phone == other.phone
            && self.email == other.email
            && self.role == other.role
            && self.labels == other.labels
    }

    /// Checks that no label is empty, on the person or on any anniversary.
    ///
    /// Empty labels cannot be told apart from "no label" in the CSV list
    /// columns, so they are refused wherever a record enters the roster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the person.
    pub fn check_labels(&self) -> Result<()> {
        if self.labels.iter().any(String::is_empty) {
            return Err(Error::InvalidInput(format!(
                "{} has an empty label",
                self.describe()
            )));
        }
        for anniversary in &self.anniversaries {
            anniversary.check_labels().map_err(|e| match e {
                Error::InvalidInput(msg) => {
                    Error::InvalidInput(format!("{}: {msg}", self.describe()))
                },
                other => other,
            })?;
        }
        Ok(())
    }

    /// Returns `name (identity)`, the form used in user-facing reports.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    #[test_case("abc123" ; "alphanumeric")]
    #[test_case("00000000-0000-0000-0000-000000000001" ; "uuid")]
    #[test_case("a" ; "single char")]
    fn test_valid_identities(id: &str) {
        assert!(PersonId::parse(id).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("abc 123" ; "space")]
    #[test_case("abc_123" ; "underscore")]
    #[test_case("00000000-0000-0000-0000-0000000000012" ; "too long")]
    fn test_invalid_identities(id: &str) {
        assert!(matches!(PersonId::parse(id), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_generated_identity_is_valid() {
        let id = PersonId::generate();
        assert!(id.is_valid());
        assert_eq!(id.as_str().len(), IDENTITY_MAX_LEN);
    }

    #[test]
    fn test_identities_conflict() {
        assert!(identities_conflict("abc", "abc"));
        assert!(identities_conflict("abc", "abc123"));
        assert!(identities_conflict("abc123", "abc"));
        assert!(!identities_conflict("abc", "abd"));
        assert!(!identities_conflict("abc123", "abc124"));
    }

    #[test]
    fn test_same_record_ignores_anniversaries() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let a = Person::new("abc123", "Jane").with_email("j@x.com");
        let b = a
            .clone()
            .with_anniversaries(vec![Anniversary::new(date, "Joined")]);
        assert!(a.same_record(&b));
        assert_ne!(a, b);
        assert!(!a.same_record(&a.clone().with_email("other@x.com")));
    }

    #[test]
    fn test_with_anniversaries_dedups() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let joined = Anniversary::new(date, "Joined");
        let person = Person::new("abc", "Jane").with_anniversaries(vec![joined.clone(), joined]);
        assert_eq!(person.anniversaries.len(), 1);
    }

    #[test]
    fn test_check_labels() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let jane = Person::new("abc", "Jane").with_label("a;b");
        assert!(jane.check_labels().is_ok());

        let err = jane.clone().with_label("").check_labels().unwrap_err();
        assert!(matches!(&err, Error::InvalidInput(msg) if msg.contains("Jane (abc)")));

        let unnamed = jane.with_anniversaries(vec![
            Anniversary::new(date, "Joined").with_type("", "orphan note"),
        ]);
        let err = unnamed.check_labels().unwrap_err();
        assert!(matches!(&err, Error::InvalidInput(msg) if msg.contains("Jane (abc)") && msg.contains("Joined")));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Person::new("abc123", "Jane").describe(), "Jane (abc123)");
    }
}
