//! The interactive menus.
//!
//! A session is a loop over three states: the main menu, the reports menu,
//! and exited. Every handler receives the [`Store`] explicitly; the menu
//! itself owns only the prompt and its settings.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::NaiveDate;
use friends::{Birthday, Config, LoadStatus, Person, PersonId, Store};
use tracing::instrument;

use super::{
    prompt::{Prompt, PromptError},
    reports,
    terminal::Style,
};

/// The literal a user must type to confirm a delete. Case is ignored.
const DELETE_CONFIRMATION: &str = "YES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Main,
    Reports,
    Exited,
}

pub struct Menu<R, W> {
    prompt: Prompt<R, W>,
    config: Config,
    today: NaiveDate,
    style: Style,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub const fn new(prompt: Prompt<R, W>, config: Config, today: NaiveDate, style: Style) -> Self {
        Self {
            prompt,
            config,
            today,
            style,
        }
    }

    /// Loads the backing file into `store`, then runs the menus.
    pub fn start(&mut self, store: &mut Store) -> anyhow::Result<()> {
        self.load(store)?;
        self.run(store)
    }

    /// Runs the menus until the user exits.
    ///
    /// Returns an error if the input closes first, in which case nothing is
    /// saved.
    pub fn run(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let mut state = State::Main;
        loop {
            state = match state {
                State::Main => self.main_menu(store)?,
                State::Reports => self.reports_menu(store)?,
                State::Exited => return Ok(()),
            };
        }
    }

    fn load(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let path = &self.config.data_file;
        self.prompt.say(format!("Loading contacts from {}...", path.display()))?;

        let status = store
            .load(path)
            .with_context(|| format!("Failed to load contacts from {}", path.display()))?;

        match status {
            LoadStatus::Missing => {
                let message = format!(
                    "No contact file found at {}; starting with an empty list.",
                    path.display()
                );
                self.prompt.say(self.style.info(&message))?;
            }
            LoadStatus::Loaded {
                records,
                skipped_rows,
                dropped_birthdays,
            } => {
                self.prompt.say(format!("Loaded {records} contacts."))?;
                if skipped_rows > 0 {
                    let message = format!("Skipped {skipped_rows} unreadable rows.");
                    self.prompt.say(self.style.warning(&message))?;
                }
                if dropped_birthdays > 0 {
                    let message = format!("Ignored {dropped_birthdays} invalid birthdays.");
                    self.prompt.say(self.style.warning(&message))?;
                }
            }
        }
        Ok(())
    }

    fn main_menu(&mut self, store: &mut Store) -> anyhow::Result<State> {
        self.prompt.say("\nMy Friends App")?;
        self.prompt.say("1 - Create new friend record")?;
        self.prompt.say("2 - Search for a friend")?;
        self.prompt.say("3 - Run reports")?;
        self.prompt.say("4 - Exit")?;
        let choice = self.prompt.ask("Choose an option: ")?;

        let next = match choice.trim() {
            "1" => {
                self.create(store)?;
                State::Main
            }
            "2" => {
                self.search(store)?;
                State::Main
            }
            "3" => State::Reports,
            "4" => self.exit(store)?,
            _ => {
                self.prompt.say(self.style.warning("Invalid selection."))?;
                State::Main
            }
        };
        Ok(next)
    }

    fn reports_menu(&mut self, store: &Store) -> anyhow::Result<State> {
        self.prompt.say("\nReports Menu")?;
        self.prompt.say("3.1 - List of friends alphabetically")?;
        self.prompt.say("3.2 - List of friends by upcoming birthdays")?;
        self.prompt.say("3.3 - Mailing labels")?;
        self.prompt.say("3.9 - Return to previous menu")?;
        let choice = self.prompt.ask("Enter choice: ")?;

        match choice.trim() {
            "3.1" => {
                let people = store.alphabetical(self.config.case_insensitive_sort);
                reports::alphabetical(self.prompt.output(), &people)?;
            }
            "3.2" => {
                let people = store.upcoming_birthdays(self.today);
                reports::upcoming_birthdays(self.prompt.output(), &people)?;
            }
            "3.3" => reports::mailing_labels(self.prompt.output(), store.iter())?,
            "3.9" => return Ok(State::Main),
            _ => self.prompt.say(self.style.warning("Invalid choice."))?,
        }
        Ok(State::Reports)
    }

    #[instrument(skip_all)]
    fn create(&mut self, store: &mut Store) -> Result<(), PromptError> {
        self.prompt.say("\nCreate New Friend")?;
        let first = self.prompt.ask("First name: ")?;
        let last = self.prompt.ask("Last name: ")?;
        let birthday = self.ask_birthday()?;

        let mut person = Person::new(first, last).with_birthday(birthday);
        person.city = self.prompt.ask("City: ")?;
        person.phone = self.prompt.ask("Phone: ")?;
        person.street_address = self.prompt.ask("Street address: ")?;
        person.nickname = self.prompt.ask("Nickname: ")?;
        person.email_address = self.prompt.ask("Email: ")?;
        person.state = self.prompt.ask("State: ")?;
        person.zip = self.prompt.ask("ZIP: ")?;

        tracing::info!("Created {person}");
        store.add(person);
        self.prompt.say(self.style.success("Friend added successfully!"))?;
        Ok(())
    }

    /// Asks for a birthday, giving up quietly on anything unusable.
    ///
    /// The day is only asked for if the month is a number.
    fn ask_birthday(&mut self) -> Result<Option<Birthday>, PromptError> {
        let month = self.prompt.ask("Birthday month (1-12): ")?;
        let Ok(month) = month.trim().parse::<u32>() else {
            tracing::debug!("No birthday attached: month {month:?} is not a number");
            return Ok(None);
        };

        let day = self.prompt.ask("Birthday day: ")?;
        let Ok(day) = day.trim().parse::<u32>() else {
            tracing::debug!("No birthday attached: day {day:?} is not a number");
            return Ok(None);
        };

        match Birthday::new(month, day) {
            Ok(birthday) => Ok(Some(birthday)),
            Err(e) => {
                tracing::debug!("No birthday attached: {e}");
                Ok(None)
            }
        }
    }

    #[instrument(skip_all)]
    fn search(&mut self, store: &mut Store) -> Result<(), PromptError> {
        let query = self.prompt.ask("Search by first or last name: ")?;
        let matches: Vec<(PersonId, String)> = store
            .search(&query)
            .into_iter()
            .map(|(id, person)| (id, person.display_text()))
            .collect();

        if matches.is_empty() {
            self.prompt.say(self.style.info("No matches found."))?;
            return Ok(());
        }

        for (index, (_, name)) in matches.iter().enumerate() {
            self.prompt.say(format!("{}. {name}", index + 1))?;
        }

        let choice = self
            .prompt
            .ask("Enter number to edit/delete or press Enter to cancel: ")?;
        let choice = choice.trim();
        if choice.is_empty() {
            return Ok(());
        }

        let selected = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| matches.get(index));
        let Some(&(id, _)) = selected else {
            tracing::debug!(
                "Selection {choice:?} is not one of the {} matches",
                matches.len()
            );
            self.prompt.say(self.style.warning("Invalid selection; nothing changed."))?;
            return Ok(());
        };

        let action = self.prompt.ask("Type E to edit or D to delete: ")?;
        match action.trim().to_uppercase().as_str() {
            "E" => self.edit(store, id),
            "D" => self.delete(store, id),
            _ => {
                self.prompt.say(self.style.dim("No action taken."))?;
                Ok(())
            }
        }
    }

    fn edit(&mut self, store: &mut Store, id: PersonId) -> Result<(), PromptError> {
        let Some(person) = store.get_mut(id) else {
            return Ok(());
        };

        self.prompt.say("Editing. Leave blank to keep current value.")?;
        let fields = [
            ("City", &mut person.city),
            ("Phone", &mut person.phone),
            ("Email", &mut person.email_address),
        ];
        for (label, value) in fields {
            let answer = self.prompt.ask(&format!("{label} [{value}]: "))?;
            if !answer.is_empty() {
                *value = answer;
            }
        }

        tracing::info!("Edited {person}");
        Ok(())
    }

    fn delete(&mut self, store: &mut Store, id: PersonId) -> Result<(), PromptError> {
        let confirm = self
            .prompt
            .ask(&format!("Are you sure? Type {DELETE_CONFIRMATION} to confirm: "))?;

        if confirm.trim().eq_ignore_ascii_case(DELETE_CONFIRMATION) {
            if let Some(person) = store.remove(id) {
                tracing::info!("Deleted {person}");
            }
            self.prompt.say(self.style.success("Friend deleted."))?;
        } else {
            self.prompt.say(self.style.dim("Delete cancelled."))?;
        }
        Ok(())
    }

    /// Saves and exits; on failure stays in the main menu so nothing is lost.
    fn exit(&mut self, store: &Store) -> anyhow::Result<State> {
        let path = &self.config.data_file;
        match store.save(path) {
            Ok(()) => {
                let message = format!("Saved {} contacts to {}.", store.len(), path.display());
                self.prompt.say(self.style.success(&message))?;
                self.prompt.say("Goodbye!")?;
                Ok(State::Exited)
            }
            Err(e) => {
                tracing::error!("{e}");
                let message = format!("Could not save: {e}");
                self.prompt.say(self.style.warning(&message))?;
                Ok(State::Main)
            }
        }
    }
}
