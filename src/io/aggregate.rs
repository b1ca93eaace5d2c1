//! Folding CSV rows into people and back.
//!
//! Decoded CSV repeats a person's columns once per anniversary. [`fold`]
//! groups those rows back into one [`Person`] per [`IdentityKey`];
//! [`explode`] is its inverse and produces the rows [`super::formats::csv`]
//! encodes.
//!
//! Rows are grouped by the whole key rather than the identity alone, so two
//! rows that share an identity but disagree on any other person column
//! become two people. The import step then reports the second one as a
//! conflict instead of silently merging different records.

use crate::io::formats::csv::{EventColumns, PersonRow, join_list, split_list};
use crate::models::{Anniversary, AnniversaryType, Person, PersonId};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Date format used in the `eventDate` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key deciding which rows describe the same person.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: String,
    /// Identity string.
    pub identity: String,
    /// Labels.
    pub labels: BTreeSet<String>,
}

impl IdentityKey {
    /// Builds the key of a row.
    #[must_use]
    pub fn of(row: &PersonRow) -> Self {
        Self {
            name: row.name.clone(),
            phone: row.phone.clone(),
            email: row.email.clone(),
            role: row.role.clone(),
            identity: row.identity.clone(),
            labels: row.labels.clone(),
        }
    }

    fn into_person(self, anniversaries: Vec<Anniversary>) -> Person {
        Person {
            identity: PersonId::new(self.identity),
            name: self.name,
            phone: self.phone,
            email: self.email,
            role: self.role,
            labels: self.labels,
            anniversaries: Vec::new(),
        }
        .with_anniversaries(anniversaries)
    }
}

/// Groups rows into people.
///
/// People come out in the order their first row appears. Rows whose event
/// columns are all empty contribute no anniversary; field-identical
/// anniversaries are kept once.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if a row has event columns but no
/// parsable `eventDate`.
pub fn fold(rows: Vec<PersonRow>) -> Result<Vec<Person>> {
    let row_count = rows.len();
    let mut groups: Vec<(IdentityKey, Vec<Anniversary>)> = Vec::new();
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for row in rows {
        let anniversary = parse_anniversary(&row.event, row.line)?;
        let key = IdentityKey::of(&row);

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Vec::new()));
                groups.len() - 1
            },
        };

        if let Some(anniversary) = anniversary {
            groups[slot].1.push(anniversary);
        }
    }

    tracing::debug!(rows = row_count, persons = groups.len(), "Folded CSV rows");

    Ok(groups
        .into_iter()
        .map(|(key, anniversaries)| key.into_person(anniversaries))
        .collect())
}

/// Flattens people into rows: one per anniversary, or a single row with
/// empty event columns for a person without any.
#[must_use]
pub fn explode(persons: &[Person]) -> Vec<PersonRow> {
    let mut rows = Vec::with_capacity(persons.len());

    for person in persons {
        let base = PersonRow {
            identity: person.identity.to_string(),
            name: person.name.clone(),
            phone: person.phone.clone(),
            email: person.email.clone(),
            role: person.role.clone(),
            labels: person.labels.clone(),
            event: EventColumns::default(),
            line: 0,
        };

        if person.anniversaries.is_empty() {
            rows.push(base);
            continue;
        }

        for anniversary in &person.anniversaries {
            rows.push(PersonRow {
                event: event_columns(anniversary),
                ..base.clone()
            });
        }
    }

    rows
}

fn event_columns(anniversary: &Anniversary) -> EventColumns {
    EventColumns {
        date: anniversary.date.format(DATE_FORMAT).to_string(),
        type_names: join_list(anniversary.types.iter().map(|t| t.name.as_str())),
        type_notes: join_list(anniversary.types.iter().map(|t| t.description.as_str())),
        title: anniversary.name.clone(),
        description: anniversary.description.clone(),
    }
}

/// Parses the event columns of a row; `None` when they are all empty.
fn parse_anniversary(event: &EventColumns, line: u64) -> Result<Option<Anniversary>> {
    if event.is_empty() {
        return Ok(None);
    }

    let date = NaiveDate::parse_from_str(event.date.trim(), DATE_FORMAT).map_err(|e| {
        Error::MalformedInput(format!(
            "line {line}: invalid eventDate '{}': {e}",
            event.date
        ))
    })?;

    let types = parse_types(event, line)?;

    Ok(Some(Anniversary {
        date,
        types,
        name: event.title.clone(),
        description: event.description.clone(),
    }))
}

/// Zips the label names with their positional notes.
///
/// A missing trailing note is empty. A note without a name, or an empty name
/// between separators, cannot be placed and is rejected.
fn parse_types(event: &EventColumns, line: u64) -> Result<BTreeSet<AnniversaryType>> {
    let names = split_list(&event.type_names);
    let notes = split_list(&event.type_notes);

    if notes.len() > names.len() {
        return Err(Error::MalformedInput(format!(
            "line {line}: {} eventLabelNote item(s) for {} eventLabelName item(s)",
            notes.len(),
            names.len()
        )));
    }
    if names.iter().any(String::is_empty) {
        return Err(Error::MalformedInput(format!(
            "line {line}: empty item in eventLabelName '{}'",
            event.type_names
        )));
    }

    let mut notes = notes.into_iter();
    Ok(names
        .into_iter()
        .map(|name| AnniversaryType::new(name, notes.next().unwrap_or_default()))
        .collect())
}
