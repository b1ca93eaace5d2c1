//! Data models for the roster.
//!
//! A [`Person`] owns an ordered list of [`Anniversary`] values. Anniversaries
//! have no identity of their own and are always copied, never shared.

mod anniversary;
mod person;

pub use anniversary::{Anniversary, AnniversaryType, dedup_anniversaries};
pub use person::{IDENTITY_MAX_LEN, Person, PersonId, identities_conflict};
