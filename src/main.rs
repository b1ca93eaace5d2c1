//! Binary entry point for roster.
//!
//! This binary provides the CLI interface for the roster store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use roster::config::{CONFIG_PATH_ENV, RosterConfig};
use roster::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Roster - employee roster import and export.
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the roster file (overrides config).
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Import people from a CSV or JSON file.
    Import {
        /// File to import.
        file: PathBuf,

        /// File format: csv or json (default: from extension).
        #[arg(short, long)]
        format: Option<String>,

        /// Import mode: append or overwrite (default: from config).
        #[arg(short, long)]
        mode: Option<String>,

        /// Show what would be imported without changing the roster.
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the roster to a CSV or JSON file.
    Export {
        /// Output file.
        output: PathBuf,

        /// File format: csv or json (default: from extension).
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List everyone in the roster.
    List,

    /// Add a person.
    Add {
        /// Display name.
        #[arg(short, long)]
        name: String,

        /// Identity (default: a generated UUID).
        #[arg(short, long)]
        identity: Option<String>,

        /// Phone number.
        #[arg(long)]
        phone: Option<String>,

        /// Email address.
        #[arg(short, long)]
        email: Option<String>,

        /// Role.
        #[arg(short, long)]
        role: Option<String>,

        /// Labels (comma-separated).
        #[arg(short, long)]
        labels: Option<String>,
    },

    /// Delete a person by identity prefix.
    Delete {
        /// Identity or unambiguous identity prefix.
        prefix: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(
        config.logging.as_ref(),
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    let result = run_command(cli, config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: RosterConfig) -> roster::Result<()> {
    let config = match cli.store {
        Some(store) => config.with_store_path(store),
        None => config,
    };
    let store_path = config.store_path.clone();

    match cli.command {
        Commands::Import {
            file,
            format,
            mode,
            dry_run,
        } => commands::cmd_import(&config, &store_path, file, format, mode, dry_run),

        Commands::Export { output, format } => commands::cmd_export(&store_path, output, format),

        Commands::List => commands::cmd_list(&store_path),

        Commands::Add {
            name,
            identity,
            phone,
            email,
            role,
            labels,
        } => commands::cmd_add(&store_path, name, identity, phone, email, role, labels),

        Commands::Delete { prefix } => commands::cmd_delete(&store_path, &prefix),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> roster::Result<RosterConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return RosterConfig::load_from_file(std::path::Path::new(config_path))
            .map(RosterConfig::with_env_overrides);
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        if !config_path.trim().is_empty() {
            return RosterConfig::load_from_file(std::path::Path::new(&config_path))
                .map(RosterConfig::with_env_overrides);
        }
    }

    // Otherwise, load from default location
    Ok(RosterConfig::load_default().with_env_overrides())
}
