//! Tabular (CSV) codec.
//!
//! One row per anniversary, with the person's columns repeated on every row.
//! A person without anniversaries is a single row whose event columns are
//! empty. Folding rows back into people is done by [`crate::io::aggregate`].
//!
//! # Columns
//!
//! `identity, name, phone, email, role, labels, eventDate, eventLabelName,
//! eventLabelNote, eventTitle, eventDescription`
//!
//! `labels`, `eventLabelName` and `eventLabelNote` hold `;`-joined lists;
//! the two event label columns are parallel lists of names and notes. Inside
//! a list item, `;` and `\` are escaped with a backslash.

use crate::{Error, Result};
use std::collections::BTreeSet;

/// Column names, in the order they are written.
pub const COLUMNS: [&str; 11] = [
    "identity",
    "name",
    "phone",
    "email",
    "role",
    "labels",
    "eventDate",
    "eventLabelName",
    "eventLabelNote",
    "eventTitle",
    "eventDescription",
];

/// Separator for list-valued columns.
pub const LIST_SEPARATOR: char = ';';

/// Escape character inside list items.
pub const LIST_ESCAPE: char = '\\';

/// Number of leading header columns affected by the rotated-header defect.
const ROTATED_PREFIX: usize = 5;

/// Raw anniversary columns of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventColumns {
    /// `eventDate`, expected as `YYYY-MM-DD`.
    pub date: String,
    /// `eventLabelName`, `;`-joined.
    pub type_names: String,
    /// `eventLabelNote`, `;`-joined, parallel to `type_names`.
    pub type_notes: String,
    /// `eventTitle`.
    pub title: String,
    /// `eventDescription`.
    pub description: String,
}

impl EventColumns {
    /// Returns whether every event column is empty, meaning "no event".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.type_names.is_empty()
            && self.type_notes.is_empty()
            && self.title.is_empty()
            && self.description.is_empty()
    }
}

/// One decoded or to-be-encoded CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonRow {
    /// `identity`.
    pub identity: String,
    /// `name`.
    pub name: String,
    /// `phone`.
    pub phone: String,
    /// `email`.
    pub email: String,
    /// `role`.
    pub role: String,
    /// `labels`, split on `;`.
    pub labels: BTreeSet<String>,
    /// Anniversary columns; all empty when the row carries no anniversary.
    pub event: EventColumns,
    /// 1-based source line, or 0 for rows not read from text.
    pub line: u64,
}

/// Rows decoded from CSV text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRows {
    /// Rows in input order.
    pub rows: Vec<PersonRow>,
    /// Data lines dropped because they had fewer fields than the header.
    pub skipped: usize,
}

/// Splits a `;`-joined list, unescaping items.
///
/// Items keep their position, so `a;;b` yields an empty middle item. An
/// empty value is an empty list. A backslash before anything other than `;`
/// or `\` is kept literally.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            LIST_ESCAPE => match chars.next() {
                Some(next @ (LIST_SEPARATOR | LIST_ESCAPE)) => current.push(next),
                Some(other) => {
                    current.push(LIST_ESCAPE);
                    current.push(other);
                },
                None => current.push(LIST_ESCAPE),
            },
            LIST_SEPARATOR => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

/// Joins list items with `;`, escaping `;` and `\` inside items.
#[must_use]
pub fn join_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        for c in item.chars() {
            if matches!(c, LIST_SEPARATOR | LIST_ESCAPE) {
                out.push(LIST_ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes rows as CSV text with a header line.
///
/// Every field is quote-wrapped with inner quotes doubled, so empty fields
/// come out as `""` and the column count never varies. Lines end with `\n`.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn encode_rows(rows: &[PersonRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false) // the header is written as the first record
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS).map_err(|e| Error::OperationFailed {
        operation: "write_csv_headers".to_string(),
        cause: e.to_string(),
    })?;

    for row in rows {
        let labels = join_list(row.labels.iter().map(String::as_str));
        writer
            .write_record([
                row.identity.as_str(),
                row.name.as_str(),
                row.phone.as_str(),
                row.email.as_str(),
                row.role.as_str(),
                labels.as_str(),
                row.event.date.as_str(),
                row.event.type_names.as_str(),
                row.event.type_notes.as_str(),
                row.event.title.as_str(),
                row.event.description.as_str(),
            ])
            .map_err(|e| Error::OperationFailed {
                operation: "write_csv".to_string(),
                cause: e.to_string(),
            })?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::OperationFailed {
        operation: "flush_csv".to_string(),
        cause: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::OperationFailed {
        operation: "flush_csv".to_string(),
        cause: e.to_string(),
    })
}

// ============================================================================
// Decoding
// ============================================================================

/// Column positions resolved from a header.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    /// Index of each entry of [`COLUMNS`].
    indices: [usize; COLUMNS.len()],
    /// Number of header fields; shorter data lines are skipped.
    width: usize,
}

impl ColumnMap {
    /// Resolves column positions by name.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        // Some producers wrote the header with its first five names rotated
        // right by one while the data stayed in canonical order.
        if names.len() >= ROTATED_PREFIX && names[0].eq_ignore_ascii_case(COLUMNS[4]) {
            tracing::warn!(
                header = %names[..ROTATED_PREFIX].join(","),
                "Correcting rotated CSV header"
            );
            names[..ROTATED_PREFIX].rotate_left(1);
        }

        let mut indices = [0usize; COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, column) in indices.iter_mut().zip(COLUMNS) {
            match names.iter().position(|n| n.eq_ignore_ascii_case(column)) {
                Some(idx) => *slot = idx,
                None => missing.push(column),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MalformedInput(format!(
                "CSV header is missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            indices,
            width: names.len(),
        })
    }

    fn field<'r>(&self, record: &'r csv::StringRecord, column: usize) -> &'r str {
        record.get(self.indices[column]).unwrap_or_default()
    }

    fn parse_row(&self, record: &csv::StringRecord, line: u64) -> PersonRow {
        let get = |column: usize| self.field(record, column).to_string();
        PersonRow {
            identity: get(0),
            name: get(1),
            phone: get(2),
            email: get(3),
            role: get(4),
            labels: split_list(self.field(record, 5))
                .into_iter()
                .filter(|label| !label.is_empty())
                .collect(),
            event: EventColumns {
                date: get(6),
                type_names: get(7),
                type_notes: get(8),
                title: get(9),
                description: get(10),
            },
            line,
        }
    }
}

/// Decodes CSV text into rows.
///
/// Columns are located by header name. Lines with fewer fields than the
/// header are dropped and counted in [`DecodedRows::skipped`]; blank lines
/// are ignored. Both `\n` and `\r\n` line endings are accepted, and quoted
/// fields may span lines.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the input has no header, a required
/// column is missing, or a quoted field is unterminated.
pub fn decode_rows(text: &str) -> Result<DecodedRows> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n");

    // The csv reader runs an open quote to EOF and would hand back the rest
    // of the file as one short row.
    if let Some(line) = unterminated_quote(&normalized) {
        return Err(Error::MalformedInput(format!(
            "line {line}: quoted field is never closed"
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // short lines are skipped below, not rejected
        .trim(csv::Trim::None)
        .from_reader(normalized.as_bytes());

    let mut records = reader.records();
    let headers = records
        .next()
        .ok_or_else(|| Error::MalformedInput("CSV input is empty".to_string()))?
        .map_err(csv_error)?;
    let columns = ColumnMap::from_headers(&headers)?;

    let mut decoded = DecodedRows::default();
    for record in records {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);

        if record.len() < columns.width {
            tracing::debug!(line, fields = record.len(), "Skipping short CSV row");
            decoded.skipped += 1;
            continue;
        }

        decoded.rows.push(columns.parse_row(&record, line));
    }

    if decoded.skipped > 0 {
        tracing::warn!(
            skipped = decoded.skipped,
            "Dropped CSV rows with fewer fields than the header"
        );
    }

    Ok(decoded)
}

/// Returns the line of a quoted field still open at end of input.
///
/// Follows the reader's rules: a quote opens a quoted field only at the
/// start of a field, and a doubled quote inside one is a literal.
fn unterminated_quote(text: &str) -> Option<u64> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line = 1u64;
    let mut opened_at = 0u64;

    for c in text.chars() {
        state = match (state, c) {
            (State::FieldStart, '"') => {
                opened_at = line;
                State::Quoted
            },
            (State::Quoted, '"') => State::QuoteInQuoted,
            (State::QuoteInQuoted, '"') | (State::Quoted, _) => State::Quoted,
            (_, ',' | '\n') => State::FieldStart,
            _ => State::Unquoted,
        };
        if c == '\n' {
            line += 1;
        }
    }

    matches!(state, State::Quoted).then_some(opened_at)
}

#[allow(clippy::needless_pass_by_value)]
fn csv_error(e: csv::Error) -> Error {
    Error::MalformedInput(format!("invalid CSV: {e}"))
}
