//! Import/Export I/O subsystem.
//!
//! Moves a roster between the store and two external formats.
//!
//! # Architecture
//!
//! - **Format codecs** in [`formats`] turn text into people and back
//! - **Row aggregation** in [`aggregate`] folds tabular rows into people
//! - **Services** orchestrate decoding, reconciliation, and storage
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | JSON | ✓ | ✓ | `{"persons": [...]}` or a bare array |
//! | CSV | ✓ | ✓ | One row per anniversary, RFC 4180 quoting |
//!
//! # Examples
//!
//! ## Merge a CSV file into a roster
//!
//! ```rust,ignore
//! use roster::io::{ImportMode, ImportOptions, ImportService};
//!
//! let options = ImportOptions::default().with_mode(ImportMode::Append);
//! let result = ImportService::new(&mut store).import_file(path, &options)?;
//! println!("Applied {}, skipped {}", result.applied(), result.skipped());
//! ```
//!
//! ## Export a roster to JSON
//!
//! ```rust,ignore
//! use roster::io::{ExportOptions, ExportService, Format};
//!
//! let options = ExportOptions::default().with_format(Format::Json);
//! let result = ExportService::new(&store).export_file(path, &options)?;
//! println!("Exported {} people", result.exported);
//! ```

pub mod aggregate;
pub mod formats;
pub mod services;

// Re-exports for convenience
pub use formats::{Decoded, Format};
pub use services::export::{ExportOptions, ExportResult, ExportService};
pub use services::import::{
    ConflictReason, ConflictRecord, ImportMode, ImportOptions, ImportResult, ImportService,
    ReconcileReport, Reconciliation,
};
