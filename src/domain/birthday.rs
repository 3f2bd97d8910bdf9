use std::fmt;

use chrono::{Datelike, NaiveDate};

/// A recurring birthday: a month and day with no year attached.
///
/// The day is only checked against the range 1-31, not against the length of
/// the month. Dates that do not exist in a given year (February 29 outside a
/// leap year, April 31, ...) are observed on the first day of the following
/// month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Birthday {
    month: u32,
    day: u32,
}

/// Error returned when a month or day is out of range.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid birthday {month}/{day}: month must be 1-12 and day must be 1-31")]
pub struct InvalidBirthdayError {
    /// The rejected month.
    pub month: u32,
    /// The rejected day.
    pub day: u32,
}

impl Birthday {
    /// Creates a birthday from a month (1-12) and a day (1-31).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBirthdayError`] if either part is out of range.
    pub const fn new(month: u32, day: u32) -> Result<Self, InvalidBirthdayError> {
        if month < 1 || month > 12 || day < 1 || day > 31 {
            return Err(InvalidBirthdayError { month, day });
        }
        Ok(Self { month, day })
    }

    /// The month, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The day of the month, 1-31.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// The date on which this birthday is observed in the given year.
    #[must_use]
    pub fn occurrence_in(&self, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, self.month, self.day).unwrap_or_else(|| {
            // the day doesn't exist in this month; roll over to the 1st of the next.
            // `day` is at most 31, so only months shorter than that get here, and
            // none of those is December.
            NaiveDate::from_ymd_opt(year, self.month + 1, 1)
                .expect("the month after a short month is always in the same year")
        })
    }

    /// Number of whole days from `today` until the next occurrence.
    ///
    /// Returns 0 when the birthday falls on `today`. The result is always in
    /// the range `0..366`.
    #[must_use]
    pub fn days_until_next_occurrence(&self, today: NaiveDate) -> u32 {
        let mut next = self.occurrence_in(today.year());
        if next < today {
            next = self.occurrence_in(today.year() + 1);
        }
        u32::try_from((next - today).num_days()).expect("next occurrence is never in the past")
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test_case(3, 15, date(2025, 3, 10), 5; "later this month")]
    #[test_case(3, 10, date(2025, 3, 10), 0; "today")]
    #[test_case(3, 9, date(2025, 3, 10), 364; "yesterday wraps to next year")]
    #[test_case(1, 1, date(2025, 12, 31), 1; "new year")]
    #[test_case(2, 29, date(2025, 2, 1), 28; "leap day observed on march 1st")]
    #[test_case(2, 29, date(2024, 2, 1), 28; "leap day in a leap year")]
    #[test_case(2, 29, date(2025, 3, 1), 0; "observed leap day is today")]
    #[test_case(2, 29, date(2027, 3, 2), 364; "next leap year")]
    #[test_case(4, 31, date(2025, 4, 30), 1; "april 31st observed on may 1st")]
    fn days_until(month: u32, day: u32, today: NaiveDate, expected: u32) {
        let birthday = Birthday::new(month, day).unwrap();
        assert_eq!(birthday.days_until_next_occurrence(today), expected);
    }

    #[test_case(0, 1; "month zero")]
    #[test_case(13, 1; "month thirteen")]
    #[test_case(1, 0; "day zero")]
    #[test_case(1, 32; "day thirty-two")]
    fn out_of_range_is_rejected(month: u32, day: u32) {
        assert_eq!(
            Birthday::new(month, day),
            Err(InvalidBirthdayError { month, day })
        );
    }

    #[test]
    fn days_until_is_always_less_than_a_year() {
        let birthdays = [(1, 1), (2, 28), (2, 29), (2, 31), (6, 30), (12, 31)];
        for year in [2023, 2024] {
            let mut today = date(year, 1, 1);
            while today.year() == year {
                for (month, day) in birthdays {
                    let days = Birthday::new(month, day)
                        .unwrap()
                        .days_until_next_occurrence(today);
                    assert!(days < 366, "{month}/{day} from {today} gave {days}");
                }
                today = today.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn displays_as_month_and_day() {
        assert_eq!(Birthday::new(3, 7).unwrap().to_string(), "03/07");
    }
}
