//! Roster import service.
//!
//! Decodes a file, then reconciles the decoded people against a store in
//! one of two modes:
//!
//! - [`ImportMode::Overwrite`] swaps the whole store for the batch. The
//!   batch is checked first and the store is untouched if the check fails.
//! - [`ImportMode::Append`] classifies each incoming person against the
//!   store, in input order, as new, mergeable, or conflicting. A conflict
//!   only skips that person.

use crate::io::formats::{self, Format};
use crate::models::{Person, PersonId, dedup_anniversaries};
use crate::services::identity;
use crate::storage::{InMemoryRoster, RosterStore};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// How an import is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Merge into the existing roster.
    #[default]
    Append,
    /// Replace the roster with the imported batch.
    Overwrite,
}

impl FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "append" | "merge" => Ok(Self::Append),
            "overwrite" | "replace" => Ok(Self::Overwrite),
            _ => Err(Error::InvalidInput(format!("Unknown import mode: {s}"))),
        }
    }
}

impl std::fmt::Display for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Options for roster import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// File format; detected from the file extension when `None`.
    pub format: Option<Format>,
    /// Write mode.
    pub mode: ImportMode,
    /// Drop incoming anniversaries the matched person already has.
    ///
    /// On by default, which differs from a literal append: a merge never
    /// leaves a person holding two field-identical anniversaries. Set to
    /// `false` to append every incoming anniversary as is.
    pub dedup_merged_anniversaries: bool,
    /// Classify without writing to the store.
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: None,
            mode: ImportMode::Append,
            dedup_merged_anniversaries: true,
            dry_run: false,
        }
    }
}

impl ImportOptions {
    /// Sets the format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the write mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables dropping duplicate anniversaries on merge.
    #[must_use]
    pub const fn with_dedup_merged_anniversaries(mut self, dedup: bool) -> Self {
        self.dedup_merged_anniversaries = dedup;
        self
    }

    /// Enables or disables dry run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Why an incoming person was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// Exactly one stored person matched, but its fields differ.
    FieldMismatch {
        /// Identity of the stored person.
        existing: PersonId,
    },
    /// The identity matched several stored people by prefix.
    AmbiguousPrefix {
        /// Identities of the matched people.
        matches: Vec<PersonId>,
    },
    /// The identity is empty, too long, or uses characters outside
    /// `[A-Za-z0-9-]`.
    InvalidIdentity,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldMismatch { existing } => {
                write!(f, "differs from stored record {existing}")
            },
            Self::AmbiguousPrefix { matches } => {
                let ids: Vec<&str> = matches.iter().map(PersonId::as_str).collect();
                write!(f, "identity matches several people: {}", ids.join(", "))
            },
            Self::InvalidIdentity => write!(f, "invalid identity"),
        }
    }
}

/// Classification of one incoming person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// No stored identity conflicts; insert as a new person.
    New,
    /// One stored person with identical fields; append anniversaries to it.
    Merged {
        /// Identity of the stored person.
        existing: PersonId,
    },
    /// Leave the store untouched for this person.
    Conflicting(ConflictReason),
}

/// An incoming person that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    /// Display name of the incoming person.
    pub name: String,
    /// Identity of the incoming person.
    pub identity: PersonId,
    /// Why it was skipped.
    pub reason: ConflictReason,
}

impl ConflictRecord {
    /// Returns `name (identity)`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.identity)
    }
}

/// Result of reconciling a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// People inserted.
    pub new: usize,
    /// People whose anniversaries were appended to a stored person.
    pub merged: usize,
    /// Anniversaries added across all merges.
    pub anniversaries_added: usize,
    /// People skipped, in input order.
    pub conflicts: Vec<ConflictRecord>,
}

impl ReconcileReport {
    /// Number of people applied (new plus merged).
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.new + self.merged
    }

    /// Number of people skipped.
    #[must_use]
    pub fn conflicting(&self) -> usize {
        self.conflicts.len()
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    /// Format the input was decoded as.
    pub format: Format,
    /// Mode the import ran in.
    pub mode: ImportMode,
    /// People decoded from the input.
    pub total_processed: usize,
    /// People inserted.
    pub new: usize,
    /// People merged into an existing record.
    pub merged: usize,
    /// People skipped.
    pub conflicts: Vec<ConflictRecord>,
    /// CSV rows dropped for having fewer fields than the header.
    pub skipped_rows: usize,
    /// Whether the store was left untouched on purpose.
    pub dry_run: bool,
}

impl ImportResult {
    /// Number of people applied (new plus merged).
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.new + self.merged
    }

    /// Number of people skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.conflicts.len()
    }

    /// Returns `name (identity)` for every skipped person.
    #[must_use]
    pub fn skipped_descriptions(&self) -> Vec<String> {
        self.conflicts.iter().map(ConflictRecord::describe).collect()
    }
}

/// Classifies an incoming person against the store.
#[must_use]
pub fn classify<S>(store: &S, incoming: &Person) -> Reconciliation
where
    S: RosterStore + ?Sized,
{
    if !incoming.identity.is_valid() {
        return Reconciliation::Conflicting(ConflictReason::InvalidIdentity);
    }

    let matches = identity::find_by_prefix(store, incoming.identity.as_str());
    match matches.as_slice() {
        [] => Reconciliation::New,
        [existing] if existing.same_record(incoming) => Reconciliation::Merged {
            existing: existing.identity.clone(),
        },
        [existing] => Reconciliation::Conflicting(ConflictReason::FieldMismatch {
            existing: existing.identity.clone(),
        }),
        many => Reconciliation::Conflicting(ConflictReason::AmbiguousPrefix {
            matches: many.iter().map(|p| p.identity.clone()).collect(),
        }),
    }
}

/// Applies a batch of people to the store.
///
/// # Errors
///
/// In [`ImportMode::Overwrite`], returns [`Error::InvalidInput`] if any
/// identity is malformed and [`Error::AmbiguousIdentity`] if two identities
/// in the batch conflict; the store is not modified in either case. Store
/// failures are propagated in both modes.
pub fn reconcile<S>(
    incoming: Vec<Person>,
    store: &mut S,
    mode: ImportMode,
    dedup_merged_anniversaries: bool,
) -> Result<ReconcileReport>
where
    S: RosterStore + ?Sized,
{
    match mode {
        ImportMode::Overwrite => overwrite(incoming, store),
        ImportMode::Append => append(incoming, store, dedup_merged_anniversaries),
    }
}

fn overwrite<S>(incoming: Vec<Person>, store: &mut S) -> Result<ReconcileReport>
where
    S: RosterStore + ?Sized,
{
    if let Some(bad) = incoming.iter().find(|p| !p.identity.is_valid()) {
        return Err(Error::InvalidInput(format!(
            "cannot overwrite roster: invalid identity '{}' for {}",
            bad.identity, bad.name
        )));
    }

    if let Some((a, b)) = identity::first_batch_conflict(&incoming) {
        return Err(Error::AmbiguousIdentity {
            identity: a.to_string(),
            matches: vec![a.to_string(), b.to_string()],
        });
    }

    let report = ReconcileReport {
        new: incoming.len(),
        ..ReconcileReport::default()
    };
    store.replace_all(incoming)?;
    Ok(report)
}

fn append<S>(incoming: Vec<Person>, store: &mut S, dedup: bool) -> Result<ReconcileReport>
where
    S: RosterStore + ?Sized,
{
    let mut report = ReconcileReport::default();

    for person in incoming {
        match classify(&*store, &person) {
            Reconciliation::New => {
                store.insert(person)?;
                report.new += 1;
            },
            Reconciliation::Merged { existing } => {
                let current = store
                    .get(&existing)
                    .map(|p| p.anniversaries.clone())
                    .unwrap_or_default();
                let before = current.len();

                let mut combined = current;
                combined.extend(person.anniversaries.iter().cloned());
                if dedup {
                    combined = dedup_anniversaries(combined);
                }

                report.anniversaries_added += combined.len().saturating_sub(before);
                store.mutate_anniversaries_of(&existing, combined)?;
                report.merged += 1;
            },
            Reconciliation::Conflicting(reason) => {
                tracing::info!(
                    identity = %person.identity,
                    name = %person.name,
                    reason = %reason,
                    "Skipping conflicting person"
                );
                report.conflicts.push(ConflictRecord {
                    name: person.name,
                    identity: person.identity,
                    reason,
                });
            },
        }
    }

    Ok(report)
}

/// Service for importing people into a roster store.
pub struct ImportService<'a, S: RosterStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: RosterStore + ?Sized> ImportService<'a, S> {
    /// Creates an import service writing to `store`.
    pub const fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Imports people from a file.
    ///
    /// The file is read completely before decoding starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not UTF-8, fails to
    /// decode, or the reconciliation itself fails.
    pub fn import_file(&mut self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let format = match options.format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };

        let bytes = std::fs::read(path).map_err(|e| Error::OperationFailed {
            operation: "read_import_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            Error::MalformedInput(format!("{} is not valid UTF-8: {e}", path.display()))
        })?;

        self.import_str(&text, format, options)
    }

    /// Imports people from text in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or reconciliation fails.
    pub fn import_str(
        &mut self,
        text: &str,
        format: Format,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let decoded = formats::decode(text, format)?;
        let total_processed = decoded.persons.len();

        let report = if options.dry_run {
            let mut scratch = InMemoryRoster::from_persons(self.store.persons().to_vec());
            reconcile(
                decoded.persons,
                &mut scratch,
                options.mode,
                options.dedup_merged_anniversaries,
            )?
        } else {
            reconcile(
                decoded.persons,
                &mut *self.store,
                options.mode,
                options.dedup_merged_anniversaries,
            )?
        };

        tracing::info!(
            format = %format,
            mode = %options.mode,
            processed = total_processed,
            new = report.new,
            merged = report.merged,
            conflicting = report.conflicting(),
            skipped_rows = decoded.skipped_rows,
            dry_run = options.dry_run,
            "Import finished"
        );

        Ok(ImportResult {
            format,
            mode: options.mode,
            total_processed,
            new: report.new,
            merged: report.merged,
            conflicts: report.conflicts,
            skipped_rows: decoded.skipped_rows,
            dry_run: options.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Anniversary;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn jane() -> Person {
        Person::new("abc123", "Jane")
            .with_email("j@x.com")
            .with_anniversaries(vec![Anniversary::new(date(1), "Joined")])
    }

    #[test]
    fn test_classify() {
        let store = InMemoryRoster::from_persons(vec![jane(), Person::new("abd", "John")]);

        assert_eq!(classify(&store, &Person::new("xyz", "New")), Reconciliation::New);
        assert_eq!(
            classify(&store, &jane().with_anniversaries(Vec::new())),
            Reconciliation::Merged {
                existing: PersonId::new("abc123")
            }
        );
        assert!(matches!(
            classify(&store, &jane().with_email("other@x.com")),
            Reconciliation::Conflicting(ConflictReason::FieldMismatch { .. })
        ));
        assert!(matches!(
            classify(&store, &Person::new("ab", "Prefix")),
            Reconciliation::Conflicting(ConflictReason::AmbiguousPrefix { .. })
        ));
        assert_eq!(
            classify(&store, &Person::new("not valid", "Bad")),
            Reconciliation::Conflicting(ConflictReason::InvalidIdentity)
        );
    }

    #[test]
    fn test_append_merge_appends_anniversaries() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let incoming = jane().with_anniversaries(vec![
            Anniversary::new(date(2), "Promoted"),
            Anniversary::new(date(3), "Moved"),
        ]);

        let report = reconcile(vec![incoming], &mut store, ImportMode::Append, true).unwrap();

        assert_eq!(report.applied(), 1);
        assert_eq!(report.merged, 1);
        assert_eq!(report.conflicting(), 0);
        assert_eq!(report.anniversaries_added, 2);
        assert_eq!(store.persons()[0].anniversaries.len(), 3);
    }

    #[test]
    fn test_append_merge_dedup_toggle() {
        let mut deduped = InMemoryRoster::from_persons(vec![jane()]);
        reconcile(vec![jane()], &mut deduped, ImportMode::Append, true).unwrap();
        assert_eq!(deduped.persons()[0].anniversaries.len(), 1);

        let mut literal = InMemoryRoster::from_persons(vec![jane()]);
        reconcile(vec![jane()], &mut literal, ImportMode::Append, false).unwrap();
        assert_eq!(literal.persons()[0].anniversaries.len(), 2);
    }

    #[test]
    fn test_append_conflict_leaves_store_untouched() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let before = store.clone();

        let report = reconcile(
            vec![jane().with_email("other@x.com")],
            &mut store,
            ImportMode::Append,
            true,
        )
        .unwrap();

        assert_eq!(store, before);
        assert_eq!(report.applied(), 0);
        assert_eq!(report.conflicting(), 1);
        assert_eq!(report.conflicts[0].describe(), "Jane (abc123)");
    }

    #[test]
    fn test_append_continues_after_conflict() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let report = reconcile(
            vec![
                jane().with_role("Other"),
                Person::new("new1", "Ann"),
                Person::new("new1", "Ann"),
            ],
            &mut store,
            ImportMode::Append,
            true,
        )
        .unwrap();

        // The second "new1" merges into the first one inserted by this batch.
        assert_eq!(report.new, 1);
        assert_eq!(report.merged, 1);
        assert_eq!(report.conflicting(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_overwrite_replaces_store() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let report = reconcile(
            vec![Person::new("a1", "A"), Person::new("b1", "B")],
            &mut store,
            ImportMode::Overwrite,
            true,
        )
        .unwrap();
        assert_eq!(report.applied(), 2);
        let ids: Vec<_> = store.persons().iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1"]);
    }

    #[test]
    fn test_overwrite_rejects_colliding_batch() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let before = store.clone();

        let err = reconcile(
            vec![Person::new("a1", "A"), Person::new("a1", "Other A")],
            &mut store,
            ImportMode::Overwrite,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::AmbiguousIdentity { .. }));

        let err = reconcile(
            vec![Person::new("a1", "A"), Person::new("bad id", "B")],
            &mut store,
            ImportMode::Overwrite,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert_eq!(store, before);
    }

    #[test]
    fn test_import_str_dry_run() {
        let mut store = InMemoryRoster::from_persons(vec![jane()]);
        let before = store.clone();
        let text = r#"{"persons": [{"identity": "new1", "name": "Ann"}]}"#;

        let result = ImportService::new(&mut store)
            .import_str(text, Format::Json, &ImportOptions::default().with_dry_run(true))
            .unwrap();

        assert_eq!(result.new, 1);
        assert!(result.dry_run);
        assert_eq!(store, before);
    }

    #[test]
    fn test_import_mode_parse() {
        assert_eq!("APPEND".parse::<ImportMode>().unwrap(), ImportMode::Append);
        assert_eq!(
            "overwrite".parse::<ImportMode>().unwrap(),
            ImportMode::Overwrite
        );
        assert!("upsert".parse::<ImportMode>().is_err());
    }
}
