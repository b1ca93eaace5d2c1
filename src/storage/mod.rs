//! Storage layer abstraction.
//!
//! [`RosterStore`] is the seam the import and roster services write
//! through. [`InMemoryRoster`] implements it, and [`file`] persists it
//! between runs.

pub mod file;
mod memory;
pub mod traits;

pub use file::{load_roster, save_roster};
pub use memory::InMemoryRoster;
pub use traits::RosterStore;
