//! Plain-text contact book
//!
//! Friends, their birthdays and their addresses are kept in a single CSV
//! file.

pub mod domain;
pub use domain::{Birthday, Config, InvalidBirthdayError, Person};

/// CSV storage and the in-memory collection of contacts.
pub mod storage;
pub use storage::{LoadError, LoadStatus, PersonId, SaveError, Store};
