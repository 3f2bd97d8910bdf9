//! Domain models for the contact book.
//!
//! This module contains the contact record, its optional birthday, and the
//! configuration that controls where records live and how they are listed.

mod birthday;
pub use birthday::{Birthday, InvalidBirthdayError};

/// Contact records.
pub mod person;
pub use person::Person;

mod config;
pub use config::Config;
