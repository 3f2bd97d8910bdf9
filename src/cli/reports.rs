//! Rendering of the read-only reports.
//!
//! Each report is computed by the caller from the current store and written
//! here line by line.

use std::io::{self, Write};

use friends::Person;

use super::terminal;

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{}", terminal::rule())
}

fn nobody(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "No friends on file.")
}

/// One name per line, in the order given.
pub fn alphabetical(out: &mut impl Write, people: &[&Person]) -> io::Result<()> {
    heading(out, "Friends A-Z")?;
    if people.is_empty() {
        return nobody(out);
    }
    for person in people {
        writeln!(out, "{person}")?;
    }
    Ok(())
}

/// One name per line with the countdown to the next birthday.
pub fn upcoming_birthdays(
    out: &mut impl Write,
    people: &[(&Person, Option<u32>)],
) -> io::Result<()> {
    heading(out, "Upcoming birthdays")?;
    if people.is_empty() {
        return nobody(out);
    }
    for (person, days) in people {
        match days {
            Some(0) => writeln!(out, "{person} - today!")?,
            Some(days) => writeln!(out, "{person} - in {days} days")?,
            None => writeln!(out, "{person} - no birthday on file")?,
        }
    }
    Ok(())
}

/// A three-line address block per person, separated by blank lines.
pub fn mailing_labels<'a>(
    out: &mut impl Write,
    people: impl IntoIterator<Item = &'a Person>,
) -> io::Result<()> {
    heading(out, "Mailing labels")?;
    let mut any = false;
    for person in people {
        any = true;
        writeln!(out, "{person}")?;
        writeln!(out, "{}", person.street_address)?;
        writeln!(out, "{}, {} {}", person.city, person.state, person.zip)?;
        writeln!(out)?;
    }
    if !any {
        nobody(out)?;
    }
    Ok(())
}
