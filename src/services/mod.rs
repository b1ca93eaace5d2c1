//! Business logic services.
//!
//! Services sit on top of a [`crate::storage::RosterStore`] and provide the
//! write-side operations that keep identities prefix-free.

pub mod identity;
mod roster;

pub use roster::{NewPerson, PersonEdit, RosterService};
