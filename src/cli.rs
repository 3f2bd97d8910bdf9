use std::{
    io,
    path::{Path, PathBuf},
};

mod menu;
mod prompt;
mod reports;
mod terminal;

use clap::ArgAction;
use friends::{Config, Store};
use menu::Menu;
use prompt::Prompt;
use terminal::Style;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "friends.toml")]
    config: PathBuf,

    /// The CSV file to keep contacts in (overrides the configuration)
    #[arg(short, long)]
    data: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = load_config(&self.config)?;
        if let Some(data) = self.data {
            config.data_file = data;
        }

        let today = chrono::Local::now().date_naive();
        let prompt = Prompt::new(io::stdin().lock(), io::stdout().lock());
        let mut store = Store::new();

        Menu::new(prompt, config, today, Style::detect()).start(&mut store)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stderr, so log lines never land in the middle of a menu
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Reads the configuration file, falling back to defaults if there isn't one.
#[instrument]
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).map_err(anyhow::Error::msg)
}
