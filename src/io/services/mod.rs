//! Import and export service implementations.
//!
//! Orchestrates format parsing, reconciliation, and storage operations.

pub mod export;
pub mod import;

pub use export::{ExportOptions, ExportResult, ExportService};
pub use import::{
    ConflictReason, ConflictRecord, ImportMode, ImportOptions, ImportResult, ImportService,
    ReconcileReport, Reconciliation, classify, reconcile,
};
