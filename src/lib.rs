//! # Roster
//!
//! Employee roster import and export.
//!
//! A roster is a list of people, each carrying contact fields, labels and a
//! list of anniversaries. Rosters move between a store and two file formats:
//!
//! - **CSV**: one row per anniversary, person columns repeated
//! - **JSON**: one object per person with anniversaries nested
//!
//! Importing reconciles incoming people against the store: new identities
//! are inserted, identical records have their anniversaries merged, and
//! anything else is reported as a conflict and left alone.
//!
//! ## Example
//!
//! ```rust,ignore
//! use roster::io::{ImportOptions, ImportService};
//! use roster::storage::{load_roster, save_roster};
//!
//! let mut store = load_roster(&store_path)?;
//! let result = ImportService::new(&mut store)
//!     .import_file(Path::new("people.csv"), &ImportOptions::default())?;
//! save_roster(&store_path, &store)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::RosterConfig;
pub use io::{ExportService, Format, ImportMode, ImportOptions, ImportResult, ImportService};
pub use models::{Anniversary, AnniversaryType, Person, PersonId};
pub use services::RosterService;
pub use storage::{InMemoryRoster, RosterStore};

/// Error type for roster operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `MalformedInput` | Missing CSV column, unparsable date, invalid JSON, non-UTF-8 file |
/// | `AmbiguousIdentity` | A prefix matches several people, or an overwrite batch collides |
/// | `InvalidInput` | Malformed identity, unknown format or mode, duplicate anniversary |
/// | `NotFound` | A prefix matches nobody |
/// | `OperationFailed` | I/O errors, serializer failures, logging setup |
///
/// Conflicting people and short CSV rows during import are not errors; they
/// are reported in [`io::ImportResult`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// Input text could not be decoded.
    ///
    /// Raised when:
    /// - A required CSV column is missing from the header
    /// - `eventDate` is empty or not `YYYY-MM-DD` on a row with event data
    /// - JSON does not parse as a roster
    /// - A file is not valid UTF-8
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An identity does not select exactly one person.
    ///
    /// Raised when:
    /// - Prefix resolution matches more than one person
    /// - A new or edited identity would be a prefix of another, or vice versa
    /// - An overwrite batch contains identities that conflict with each other
    #[error("ambiguous identity '{identity}': matches {}", .matches.join(", "))]
    AmbiguousIdentity {
        /// The identity or prefix being resolved.
        identity: String,
        /// Identities it conflicts with.
        matches: Vec<String>,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - An identity is outside `[A-Za-z0-9-]{1,36}`
    /// - A format, mode or log format string is unknown
    /// - A person name is empty
    /// - An anniversary is added twice
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Nothing matched.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - Serialization fails
    /// - The config file cannot be parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for roster operations.
pub type Result<T> = std::result::Result<T, Error>;
