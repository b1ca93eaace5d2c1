//! Import and export command handlers.

use std::path::{Path, PathBuf};

use roster::Result;
use roster::config::RosterConfig;
use roster::io::formats::Format;
use roster::io::services::export::{ExportOptions, ExportService};
use roster::io::services::import::{ImportMode, ImportOptions, ImportService};
use roster::storage::{load_roster, save_roster};

/// Number of skipped people listed individually before summarizing.
const MAX_LISTED: usize = 20;

/// Executes the import command.
pub fn cmd_import(
    config: &RosterConfig,
    store_path: &Path,
    file: PathBuf,
    format: Option<String>,
    mode: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let mode = match mode {
        Some(m) => m.parse::<ImportMode>()?,
        None => config.import.mode,
    };

    let mut options = ImportOptions::default()
        .with_mode(mode)
        .with_dedup_merged_anniversaries(config.import.dedup_merged_anniversaries)
        .with_dry_run(dry_run);
    if let Some(f) = format {
        options = options.with_format(f.parse::<Format>()?);
    }

    let mut store = load_roster(store_path)?;
    let result = ImportService::new(&mut store).import_file(&file, &options)?;

    if !dry_run {
        save_roster(store_path, &store)?;
    }

    if dry_run {
        println!("Dry run completed (no changes made):");
    } else {
        println!("Import completed ({}):", result.mode);
    }

    println!("  Applied:          {}", result.applied());
    println!("    New:            {}", result.new);
    println!("    Merged:         {}", result.merged);
    println!("  Conflicting:      {}", result.skipped());
    println!("  Total processed:  {}", result.total_processed);
    if result.skipped_rows > 0 {
        println!("  Short rows:       {}", result.skipped_rows);
    }

    if !result.conflicts.is_empty() {
        println!();
        println!("Skipped ({}):", result.conflicts.len());
        for conflict in result.conflicts.iter().take(MAX_LISTED) {
            println!("  - {}: {}", conflict.describe(), conflict.reason);
        }
        if result.conflicts.len() > MAX_LISTED {
            println!("  ... and {} more", result.conflicts.len() - MAX_LISTED);
        }
    }

    Ok(())
}

/// Executes the export command.
pub fn cmd_export(store_path: &Path, output: PathBuf, format: Option<String>) -> Result<()> {
    let mut options = ExportOptions::default();
    if let Some(f) = format {
        options = options.with_format(f.parse::<Format>()?);
    }

    let store = load_roster(store_path)?;
    let result = ExportService::new(&store).export_file(&output, &options)?;

    println!("Export completed:");
    println!("  Exported:     {}", result.exported);
    println!("  Rows:         {}", result.rows);
    println!("  Format:       {}", result.format);
    if let Some(path) = result.output_path {
        println!("  Output:       {path}");
    }

    Ok(())
}
