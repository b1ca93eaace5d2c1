//! Roster export service.
//!
//! Writes the stored people to a file or writer in either format.

use crate::io::aggregate;
use crate::io::formats::{self, Format};
use crate::storage::RosterStore;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Options for roster export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// File format; detected from the file extension when `None`.
    pub format: Option<Format>,
}

impl ExportOptions {
    /// Sets the format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of people exported.
    pub exported: usize,
    /// Data rows written (CSV) or people written (JSON).
    pub rows: usize,
    /// Format used for export.
    pub format: Format,
    /// Output path (if file export).
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Creates a new export result.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            exported: 0,
            rows: 0,
            format,
            output_path: None,
        }
    }

    /// Returns whether any people were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Service for exporting a roster to external formats.
pub struct ExportService<'a, S: RosterStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RosterStore + ?Sized> ExportService<'a, S> {
    /// Creates an export service reading from `store`.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Exports the roster to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the format cannot be determined or the file cannot
    /// be written.
    pub fn export_file(&self, path: &Path, options: &ExportOptions) -> Result<ExportResult> {
        let format = match options.format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_export_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let file = std::fs::File::create(path).map_err(|e| Error::OperationFailed {
            operation: "create_export_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let writer = std::io::BufWriter::new(file);

        let mut result = self.export_to_writer(writer, format)?;
        result.output_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Exports the roster to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export_to_writer<W: Write>(&self, mut writer: W, format: Format) -> Result<ExportResult> {
        let text = self.export_string(format)?;
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::OperationFailed {
                operation: "write_export".to_string(),
                cause: e.to_string(),
            })?;

        let persons = self.store.persons();
        let rows = match format {
            Format::Json => persons.len(),
            Format::Csv => aggregate::explode(persons).len(),
        };

        tracing::info!(
            format = %format,
            exported = persons.len(),
            rows,
            "Export finished"
        );

        Ok(ExportResult {
            exported: persons.len(),
            rows,
            ..ExportResult::new(format)
        })
    }

    /// Encodes the roster as text.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export_string(&self, format: Format) -> Result<String> {
        formats::encode(self.store.persons(), format)
    }
}
