//! Format codecs for import/export.
//!
//! Both formats encode a slice of people to text and decode text back into
//! people. CSV goes through the row representation and
//! [`crate::io::aggregate`]; JSON maps people directly.

pub mod csv;
pub mod json;

use crate::io::aggregate;
use crate::models::Person;
use crate::{Error, Result};
use std::path::Path;
use std::str::FromStr;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Structured format: nested JSON document.
    Json,
    /// Tabular format: one CSV row per anniversary.
    Csv,
}

impl Format {
    /// Returns all formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Json, Self::Csv]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            Some(ext) => Err(Error::InvalidInput(format!(
                "Unsupported file extension: .{ext}"
            ))),
            None => Err(Error::InvalidInput(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::InvalidInput(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// People decoded from text, plus what the decoder dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded people in input order.
    pub persons: Vec<Person>,
    /// CSV rows dropped for having fewer fields than the header.
    pub skipped_rows: usize,
}

/// Encodes people in the given format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(persons: &[Person], format: Format) -> Result<String> {
    match format {
        Format::Json => json::encode(persons),
        Format::Csv => csv::encode_rows(&aggregate::explode(persons)),
    }
}

/// Decodes people from text in the given format.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the text does not parse.
pub fn decode(text: &str, format: Format) -> Result<Decoded> {
    match format {
        Format::Json => Ok(Decoded {
            persons: json::decode(text)?,
            skipped_rows: 0,
        }),
        Format::Csv => {
            let rows = csv::decode_rows(text)?;
            Ok(Decoded {
                persons: aggregate::fold(rows.rows)?,
                skipped_rows: rows.skipped,
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(Format::from_str("json").unwrap(), Format::Json);
        assert_eq!(Format::from_str("CSV").unwrap(), Format::Csv);
        assert!(Format::from_str("yaml").is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            Format::from_path(Path::new("roster.json")).unwrap(),
            Format::Json
        );
        assert_eq!(
            Format::from_path(Path::new("export/People.CSV")).unwrap(),
            Format::Csv
        );
        assert!(Format::from_path(Path::new("roster.txt")).is_err());
        assert!(Format::from_path(Path::new("roster")).is_err());
    }

    #[test]
    fn test_csv_row_count() {
        let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let persons = vec![
            Person::new("a", "A"),
            Person::new("b", "B").with_anniversaries(vec![
                crate::models::Anniversary::new(date, "one"),
                crate::models::Anniversary::new(date, "two"),
            ]),
        ];
        let text = encode(&persons, Format::Csv).unwrap();
        assert_eq!(text.lines().count(), 1 + 1 + 2);
    }

    #[test]
    fn test_decode_reports_skipped_rows() {
        let text = "identity,name,phone,email,role,labels,eventDate,eventLabelName,eventLabelNote,eventTitle,eventDescription\n\
                    abc,Jane,,,,,,,,,\n\
                    broken,row\n";
        let decoded = decode(text, Format::Csv).unwrap();
        assert_eq!(decoded.persons.len(), 1);
        assert_eq!(decoded.skipped_rows, 1);
    }
}
