//! Structured (JSON) codec.
//!
//! A roster is written as `{"persons": [...]}` with each person's
//! anniversaries nested under `anniversaries`. On read a bare top-level
//! array of people is accepted as well.

use crate::models::Person;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root object of the structured format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterDocument {
    /// People in roster order.
    #[serde(default)]
    pub persons: Vec<Person>,
}

/// Encodes people as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(persons: &[Person]) -> Result<String> {
    #[derive(Serialize)]
    struct Document<'a> {
        persons: &'a [Person],
    }

    let mut out =
        serde_json::to_string_pretty(&Document { persons }).map_err(|e| Error::OperationFailed {
            operation: "write_json".to_string(),
            cause: e.to_string(),
        })?;
    out.push('\n');
    Ok(out)
}

/// Decodes a JSON document into people.
///
/// Field-identical anniversaries within a person are kept once.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the text is not a roster document or
/// a person carries an empty label or an unnamed anniversary label.
pub fn decode(text: &str) -> Result<Vec<Person>> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();

    let persons = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Person>>(trimmed)
            .map_err(|e| Error::MalformedInput(format!("Failed to parse JSON array: {e}")))?
    } else {
        serde_json::from_str::<RosterDocument>(trimmed)
            .map_err(|e| Error::MalformedInput(format!("Failed to parse JSON document: {e}")))?
            .persons
    };

    persons
        .into_iter()
        .map(|mut p| -> Result<Person> {
            let anniversaries = std::mem::take(&mut p.anniversaries);
            let person = p.with_anniversaries(anniversaries);
            person.check_labels().map_err(|e| match e {
                Error::InvalidInput(msg) => Error::MalformedInput(msg),
                other => other,
            })?;
            Ok(person)
        })
        .collect()
}
