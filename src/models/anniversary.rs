//! Anniversary values owned by a person.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A typed label attached to an anniversary (e.g. "work" / "joined the team").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnniversaryType {
    /// Label name.
    pub name: String,
    /// Free-text note for the label.
    #[serde(default)]
    pub description: String,
}

impl AnniversaryType {
    /// Creates a new label.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A dated occurrence owned by exactly one person.
///
/// Two anniversaries are the same when every field matches, which is what
/// the derived `PartialEq` checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anniversary {
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Typed labels.
    #[serde(rename = "type", default)]
    pub types: BTreeSet<AnniversaryType>,
    /// Display title.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

impl Anniversary {
    /// Creates an anniversary with a date and title and no labels.
    #[must_use]
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            types: BTreeSet::new(),
            name: name.into(),
            description: String::new(),
        }
    }

    /// Adds a typed label.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.types.insert(AnniversaryType::new(name, description));
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks that every typed label has a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a label name is empty.
    pub fn check_labels(&self) -> Result<()> {
        if self.types.iter().any(|t| t.name.is_empty()) {
            return Err(Error::InvalidInput(format!(
                "anniversary '{}' on {} has a label without a name",
                self.name, self.date
            )));
        }
        Ok(())
    }
}

/// Removes field-identical anniversaries, keeping the first occurrence.
#[must_use]
pub fn dedup_anniversaries(anniversaries: Vec<Anniversary>) -> Vec<Anniversary> {
    let mut seen = HashSet::with_capacity(anniversaries.len());
    anniversaries
        .into_iter()
        .filter(|a| seen.insert(a.clone()))
        .collect()
}
