use std::fmt;

use crate::domain::{Birthday, InvalidBirthdayError};

/// A single contact.
///
/// Only the names are required. Every other field is free-form text that is
/// stored exactly as entered; phone numbers, email addresses and ZIP codes are
/// never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    birthday: Option<Birthday>,
    /// City or town.
    pub city: String,
    /// Phone number, in any format.
    pub phone: String,
    /// Street address (first line of a mailing label).
    pub street_address: String,
    /// Nickname.
    pub nickname: String,
    /// Email address.
    pub email_address: String,
    /// State or region.
    pub state: String,
    /// ZIP or postal code.
    pub zip: String,
}

impl Person {
    /// Creates a person with the given names and every other field empty.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// The person's birthday, if one is on file.
    #[must_use]
    pub const fn birthday(&self) -> Option<Birthday> {
        self.birthday
    }

    /// Attaches a birthday, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBirthdayError`] if the month or day is out of range, in
    /// which case the existing birthday is left untouched.
    pub fn set_birthday(&mut self, month: u32, day: u32) -> Result<(), InvalidBirthdayError> {
        self.birthday = Some(Birthday::new(month, day)?);
        Ok(())
    }

    /// Replaces the birthday with an already validated one, or removes it.
    #[must_use]
    pub fn with_birthday(mut self, birthday: Option<Birthday>) -> Self {
        self.birthday = birthday;
        self
    }

    /// The one-line form used by listings: first name then last name.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.to_string()
    }

    /// Whether `query` appears in the first or last name, ignoring case.
    ///
    /// An empty query matches everyone.
    #[must_use]
    pub fn name_contains(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.first_name.to_lowercase().contains(&query)
            || self.last_name.to_lowercase().contains(&query)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
