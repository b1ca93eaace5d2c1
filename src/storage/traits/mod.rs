//! Storage backend traits.

mod roster;

pub use roster::RosterStore;
