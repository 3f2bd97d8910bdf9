//! CSV row layout for the backing file.
//!
//! Every column is read and written as text. Birthday columns are converted
//! separately so that a bad birthday costs only the birthday, not the row.

use serde::{Deserialize, Serialize};

use crate::domain::{Birthday, InvalidBirthdayError, Person};

/// The header row, in column order.
pub const COLUMNS: [&str; 11] = [
    "first_name",
    "last_name",
    "birthday_month",
    "birthday_day",
    "city",
    "phone",
    "street_address",
    "nickname",
    "email_address",
    "state",
    "zip",
];

/// One record of the backing file.
///
/// Missing columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
    first_name: String,
    last_name: String,
    birthday_month: String,
    birthday_day: String,
    city: String,
    phone: String,
    street_address: String,
    nickname: String,
    email_address: String,
    state: String,
    zip: String,
}

/// Why the birthday columns of a row could not be used.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BirthdayColumnError {
    /// Only one of month and day is filled in.
    #[error("birthday has a month or a day but not both")]
    Incomplete,

    /// A column is not a whole number.
    #[error("'{0}' is not a whole number")]
    NotANumber(String),

    /// The numbers are out of range.
    #[error(transparent)]
    OutOfRange(#[from] InvalidBirthdayError),
}

impl Row {
    /// The birthday stored in this row.
    ///
    /// # Errors
    ///
    /// Returns an error if the birthday columns are half-filled, not numeric,
    /// or out of range.
    pub fn birthday(&self) -> Result<Option<Birthday>, BirthdayColumnError> {
        let month = self.birthday_month.trim();
        let day = self.birthday_day.trim();

        match (month.is_empty(), day.is_empty()) {
            (true, true) => return Ok(None),
            (false, false) => {}
            _ => return Err(BirthdayColumnError::Incomplete),
        }

        let month = parse_number(month)?;
        let day = parse_number(day)?;
        Ok(Some(Birthday::new(month, day)?))
    }

    /// Builds a [`Person`] from the text columns of this row and the given
    /// birthday.
    #[must_use]
    pub fn into_person(self, birthday: Option<Birthday>) -> Person {
        let mut person = Person::new(self.first_name, self.last_name).with_birthday(birthday);
        person.city = self.city;
        person.phone = self.phone;
        person.street_address = self.street_address;
        person.nickname = self.nickname;
        person.email_address = self.email_address;
        person.state = self.state;
        person.zip = self.zip;
        person
    }
}

fn parse_number(value: &str) -> Result<u32, BirthdayColumnError> {
    value
        .parse()
        .map_err(|_| BirthdayColumnError::NotANumber(value.to_string()))
}

impl From<&Person> for Row {
    fn from(person: &Person) -> Self {
        let (birthday_month, birthday_day) = person
            .birthday()
            .map(|b| (b.month().to_string(), b.day().to_string()))
            .unwrap_or_default();

        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            birthday_month,
            birthday_day,
            city: person.city.clone(),
            phone: person.phone.clone(),
            street_address: person.street_address.clone(),
            nickname: person.nickname.clone(),
            email_address: person.email_address.clone(),
            state: person.state.clone(),
            zip: person.zip.clone(),
        }
    }
}
