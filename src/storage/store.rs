//! The in-memory collection of contacts and its CSV backing file.
//!
//! The [`Store`] is the only source of truth during a session. The backing
//! file is read once with [`Store::load`] and rewritten in full by
//! [`Store::save`].

use std::{
    cmp::Ordering,
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use super::row::{COLUMNS, Row};
use crate::domain::Person;

/// A session-local handle to a record held by a [`Store`].
///
/// Handles are never reused within a store, so two records with identical
/// contents still have different handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: PersonId,
    person: Person,
}

/// An ordered collection of contacts.
///
/// Records keep the order in which they were loaded or added. Duplicates are
/// allowed.
#[derive(Debug, Default, Clone)]
pub struct Store {
    entries: Vec<Entry>,
    next_id: u64,
}

/// The outcome of a successful [`Store::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The backing file does not exist yet. Nothing was loaded.
    Missing,
    /// The backing file was read.
    Loaded {
        /// Records added to the store.
        records: usize,
        /// Rows that could not be decoded and were skipped.
        skipped_rows: usize,
        /// Records whose birthday columns were unusable and were dropped.
        dropped_birthdays: usize,
    },
}

/// Errors that prevent the backing file from being read at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file exists but could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Io {
        /// The backing file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The header row could not be read.
    #[error("failed to read the header of {}: {source}", path.display())]
    Header {
        /// The backing file.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("{} has no '{column}' column", path.display())]
    MissingColumn {
        /// The backing file.
        path: PathBuf,
        /// The name of the absent column.
        column: &'static str,
    },
}

/// Errors raised while writing the backing file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// A filesystem operation failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode {}: {source}", path.display())]
    Csv {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },
}

const REQUIRED_COLUMNS: [&str; 2] = ["first_name", "last_name"];

/// Sort key for records without a birthday; larger than any real day count.
const NO_BIRTHDAY: u32 = u32::MAX;

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the backing file at `path`, appending its records.
    ///
    /// A missing file is not an error: the store is left as it is and
    /// [`LoadStatus::Missing`] is returned. An empty file loads no records.
    ///
    /// Bad data is skipped at the smallest possible granularity. A row that
    /// cannot be decoded is skipped; a row whose birthday columns are
    /// unusable is kept without a birthday. Short rows are padded with empty
    /// columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be opened, its header
    /// cannot be read, or the header lacks a name column.
    pub fn load(&mut self, path: &Path) -> Result<LoadStatus, LoadError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No contact file at {}", path.display());
                return Ok(LoadStatus::Missing);
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .map_err(|source| LoadError::Header {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        if headers.is_empty() {
            tracing::warn!("{} is empty; treating it as no contacts", path.display());
            return Ok(LoadStatus::Loaded {
                records: 0,
                skipped_rows: 0,
                dropped_birthdays: 0,
            });
        }
        if let Some(column) = REQUIRED_COLUMNS
            .into_iter()
            .find(|column| !headers.iter().any(|h| h == *column))
        {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }

        let mut records = 0;
        let mut skipped_rows = 0;
        let mut dropped_birthdays = 0;

        for (index, result) in reader.records().enumerate() {
            // +2: one for the header, one because rows are counted from 1
            let line = index + 2;
            let row = match result.and_then(|mut record| {
                while record.len() < headers.len() {
                    record.push_field("");
                }
                record.deserialize::<Row>(Some(&headers))
            }) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping row {line} of {}: {e}", path.display());
                    skipped_rows += 1;
                    continue;
                }
            };

            let birthday = match row.birthday() {
                Ok(birthday) => birthday,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring birthday on row {line} of {}: {e}",
                        path.display()
                    );
                    dropped_birthdays += 1;
                    None
                }
            };

            let person = row.into_person(birthday);
            tracing::debug!("Loading: {person}");
            self.add(person);
            records += 1;
        }

        tracing::info!("Loaded {records} contacts from {}", path.display());

        Ok(LoadStatus::Loaded {
            records,
            skipped_rows,
            dropped_birthdays,
        })
    }

    /// Writes every record to `path`, replacing the file.
    ///
    /// The header row is always written, so saving an empty store produces a
    /// file containing just the header. The records are written to a
    /// temporary file next to `path` which is then renamed over it. If
    /// anything fails the temporary file is removed and `path` is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let io_error = |source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let temp_path = temp_path(path);
        let result = self
            .write_rows(&temp_path, path)
            .and_then(|()| fs::rename(&temp_path, path).map_err(io_error));
        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                tracing::debug!("Could not remove {}: {cleanup}", temp_path.display());
            }
            return Err(e);
        }

        tracing::info!("Saved {} contacts to {}", self.len(), path.display());
        Ok(())
    }

    fn write_rows(&self, temp_path: &Path, path: &Path) -> Result<(), SaveError> {
        let csv_error = |source| SaveError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(temp_path)
            .map_err(csv_error)?;

        writer.write_record(COLUMNS).map_err(csv_error)?;
        for person in self.iter() {
            writer.serialize(Row::from(person)).map_err(csv_error)?;
        }
        writer.flush().map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Appends a record and returns its handle.
    ///
    /// No duplicate check is performed.
    pub fn add(&mut self, person: Person) -> PersonId {
        let id = PersonId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, person });
        id
    }

    /// All records matching `predicate`, in collection order.
    pub fn find(&self, mut predicate: impl FnMut(&Person) -> bool) -> Vec<(PersonId, &Person)> {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.person))
            .map(|entry| (entry.id, &entry.person))
            .collect()
    }

    /// Records whose first or last name contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<(PersonId, &Person)> {
        self.find(|person| person.name_contains(query))
    }

    /// The record with the given handle.
    #[must_use]
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.person)
    }

    /// The record with the given handle, for editing in place.
    pub fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.person)
    }

    /// Removes the record with the given handle.
    ///
    /// Other records, including identical copies, are untouched. Returns
    /// `None` if the handle has already been removed.
    pub fn remove(&mut self, id: PersonId) -> Option<Person> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).person)
    }

    /// Iterates over the records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.entries.iter().map(|entry| &entry.person)
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The records sorted by last name, then first name.
    ///
    /// The sort is stable. With `case_insensitive` names are compared by
    /// their lowercase forms first; otherwise by their raw characters.
    #[must_use]
    pub fn alphabetical(&self, case_insensitive: bool) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.iter().collect();
        if case_insensitive {
            people.sort_by(|a, b| {
                compare_names_ignoring_case(a, b).then_with(|| compare_names(a, b))
            });
        } else {
            people.sort_by(|a, b| compare_names(a, b));
        }
        people
    }

    /// The records ordered by how soon their next birthday is, counted from
    /// `today`.
    ///
    /// Each record is paired with the number of days until its birthday.
    /// Records without a birthday come last, in collection order.
    #[must_use]
    pub fn upcoming_birthdays(&self, today: NaiveDate) -> Vec<(&Person, Option<u32>)> {
        let mut people: Vec<_> = self
            .iter()
            .map(|person| {
                let days = person
                    .birthday()
                    .map(|birthday| birthday.days_until_next_occurrence(today));
                (person, days)
            })
            .collect();
        people.sort_by_key(|&(_, days)| days.unwrap_or(NO_BIRTHDAY));
        people
    }
}

fn compare_names(a: &Person, b: &Person) -> Ordering {
    a.last_name
        .cmp(&b.last_name)
        .then_with(|| a.first_name.cmp(&b.first_name))
}

fn compare_names_ignoring_case(a: &Person, b: &Person) -> Ordering {
    a.last_name
        .to_lowercase()
        .cmp(&b.last_name.to_lowercase())
        .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::Birthday;

    const HEADER: &str = "first_name,last_name,birthday_month,birthday_day,city,phone,street_address,nickname,email_address,state,zip\n";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn person(first: &str, last: &str, birthday: Option<(u32, u32)>) -> Person {
        let mut person = Person::new(first, last);
        if let Some((month, day)) = birthday {
            person.set_birthday(month, day).unwrap();
        }
        person
    }

    fn store_of(people: impl IntoIterator<Item = Person>) -> Store {
        let mut store = Store::new();
        for person in people {
            store.add(person);
        }
        store
    }

    fn names(people: &[&Person]) -> Vec<String> {
        people.iter().map(|p| p.display_text()).collect()
    }

    fn load_str(content: &str) -> (Store, LoadStatus) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("friends.csv");
        fs::write(&path, content).unwrap();
        let mut store = Store::new();
        let status = store.load(&path).unwrap();
        (store, status)
    }

    #[test]
    fn save_then_load_reproduces_the_collection() {
        let mut messy = person("Zoë", "O'Neil, Jr.", Some((2, 29)));
        messy.street_address = "1 \"Quoted\" Lane\nFlat 2".to_string();
        messy.phone = "+44 20 7946 0958".to_string();
        messy.zip = "SW1A 1AA".to_string();
        let mut full = person("Ann", "Lee", Some((3, 15)));
        full.city = "Springfield".to_string();
        full.nickname = "Annie".to_string();
        full.email_address = "ann@example.com".to_string();
        full.state = "IL".to_string();
        let people = vec![
            full,
            person("Bob", "Stone", None),
            messy,
            person("", "", None),
            person("Bob", "Stone", None),
        ];

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("friends.csv");
        store_of(people.clone()).save(&path).unwrap();

        let mut loaded = Store::new();
        let status = loaded.load(&path).unwrap();

        assert_eq!(
            status,
            LoadStatus::Loaded {
                records: 5,
                skipped_rows: 0,
                dropped_birthdays: 0
            }
        );
        assert_eq!(loaded.iter().cloned().collect::<Vec<_>>(), people);
    }

    #[test]
    fn saving_an_empty_store_writes_only_the_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("friends.csv");

        Store::new().save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[test]
    fn save_overwrites_and_leaves_no_temporary_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("friends.csv");
        fs::write(&path, "stale contents").unwrap();

        store_of([person("Ann", "Lee", None)]).save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("{HEADER}Ann,Lee,,,,,,,,,\n"));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_save_removes_the_temporary_file() {
        let tmp = TempDir::new().unwrap();
        // a directory cannot be replaced by the renamed file
        let path = tmp.path().join("friends.csv");
        fs::create_dir(&path).unwrap();

        let error = store_of([person("Ann", "Lee", None)]).save(&path).unwrap_err();

        assert!(matches!(error, SaveError::Io { .. }));
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("friends.csv");

        Store::new().save(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn missing_file_leaves_store_empty() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::new();

        let status = store.load(&tmp.path().join("absent.csv")).unwrap();

        assert_eq!(status, LoadStatus::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn empty_file_loads_as_empty_store() {
        let (store, status) = load_str("");

        assert_eq!(
            status,
            LoadStatus::Loaded {
                records: 0,
                skipped_rows: 0,
                dropped_birthdays: 0
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn bad_birthday_drops_only_the_birthday() {
        let (store, status) = load_str(&format!(
            "{HEADER}Ann,Lee,March,15,Springfield,,,,,,\nBob,Stone,13,1,,,,,,,\nCy,Young,4,,,,,,,,\n"
        ));

        assert_eq!(
            status,
            LoadStatus::Loaded {
                records: 3,
                skipped_rows: 0,
                dropped_birthdays: 3
            }
        );
        assert!(store.iter().all(|p| p.birthday().is_none()));
        assert_eq!(store.iter().next().unwrap().city, "Springfield");
    }

    #[test]
    fn short_rows_read_missing_columns_as_empty() {
        let (store, _) = load_str(&format!("{HEADER}Ann,Lee\n"));

        let ann = store.iter().next().unwrap();
        assert_eq!(ann, &Person::new("Ann", "Lee"));
    }

    #[test]
    fn header_without_name_columns_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("friends.csv");
        fs::write(&path, "name,phone\nAnn,555\n").unwrap();

        let error = Store::new().load(&path).unwrap_err();

        assert!(matches!(
            error,
            LoadError::MissingColumn {
                column: "first_name",
                ..
            }
        ));
    }

    #[test]
    fn loaded_birthday_counts_down_from_today() {
        let (store, _) = load_str(&format!("{HEADER}Ann,Lee,3,15,,,,,,,\n"));

        let upcoming = store.upcoming_birthdays(date(2025, 3, 10));

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].0.birthday(), Some(Birthday::new(3, 15).unwrap()));
        assert_eq!(upcoming[0].1, Some(5));
    }

    #[test]
    fn search_is_case_insensitive_and_keeps_order() {
        let store = store_of([
            person("Ann", "Lee", None),
            person("Bob", "Annand", None),
            person("Cy", "Young", None),
        ]);

        let found: Vec<_> = store
            .search("ANN")
            .into_iter()
            .map(|(_, p)| p.display_text())
            .collect();

        assert_eq!(found, ["Ann Lee", "Bob Annand"]);
    }

    #[test]
    fn empty_search_matches_everyone() {
        let store = store_of([person("Ann", "Lee", None), person("Bob", "Stone", None)]);
        assert_eq!(store.search("").len(), 2);
    }

    #[test]
    fn remove_takes_only_the_selected_duplicate() {
        let mut store = Store::new();
        let first = store.add(person("Ann", "Lee", None));
        let mut second_copy = person("Ann", "Lee", None);
        second_copy.city = "Second".to_string();
        let second = store.add(second_copy);
        let _third = store.add(person("Ann", "Lee", None));

        let removed = store.remove(second).unwrap();

        assert_eq!(removed.city, "Second");
        assert_eq!(store.len(), 2);
        assert!(store.get(first).is_some());
        assert!(store.get(second).is_none());
        assert!(store.remove(second).is_none());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut store = Store::new();
        let id = store.add(person("Ann", "Lee", None));

        store.get_mut(id).unwrap().city = "Springfield".to_string();

        assert_eq!(store.get(id).unwrap().city, "Springfield");
    }

    #[test]
    fn alphabetical_sorts_by_last_then_first() {
        let store = store_of([
            person("Cy", "Young", None),
            person("Bob", "Lee", None),
            person("Ann", "Lee", None),
            person("Dee", "de Vries", None),
        ]);

        assert_eq!(
            names(&store.alphabetical(false)),
            ["Ann Lee", "Bob Lee", "Cy Young", "Dee de Vries"]
        );
        assert_eq!(
            names(&store.alphabetical(true)),
            ["Dee de Vries", "Ann Lee", "Bob Lee", "Cy Young"]
        );
    }

    #[test]
    fn alphabetical_is_non_decreasing() {
        let store = store_of([
            person("b", "B", None),
            person("A", "b", None),
            person("a", "B", None),
            person("", "", None),
            person("Z", "a", None),
        ]);

        let sorted = store.alphabetical(false);

        for pair in sorted.windows(2) {
            let key = |p: &Person| (p.last_name.clone(), p.first_name.clone());
            assert!(key(pair[0]) <= key(pair[1]));
        }
    }

    #[test]
    fn upcoming_birthdays_puts_unknown_birthdays_last() {
        let store = store_of([
            person("No", "Birthday", None),
            person("Later", "Person", Some((12, 1))),
            person("Also", "Unknown", None),
            person("Soon", "Person", Some((3, 11))),
        ]);

        let upcoming = store.upcoming_birthdays(date(2025, 3, 10));

        let order: Vec<_> = upcoming
            .iter()
            .map(|(p, days)| (p.display_text(), *days))
            .collect();
        assert_eq!(
            order,
            [
                ("Soon Person".to_string(), Some(1)),
                ("Later Person".to_string(), Some(266)),
                ("No Birthday".to_string(), None),
                ("Also Unknown".to_string(), None),
            ]
        );
    }
}
