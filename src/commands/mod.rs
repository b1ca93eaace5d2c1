//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `io.rs`: Import and export commands
//! - `people.rs`: Listing, adding and deleting people

mod io;
mod people;

// Re-export command functions
pub use io::{cmd_export, cmd_import};
pub use people::{cmd_add, cmd_delete, cmd_list};
