use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the contact book.
///
/// Stored as TOML. Every field has a default, so an empty document (apart
/// from the version tag) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The CSV file contacts are loaded from and saved to.
    ///
    /// Relative paths are resolved against the working directory.
    pub data_file: PathBuf,

    /// Whether the alphabetical report ignores case when comparing names.
    ///
    /// When `false` (default) names are compared by their raw characters, so
    /// `"de Vries"` sorts after `"Zimmer"`.
    pub case_insensitive_sort: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            case_insensitive_sort: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("friendsdatabase.csv")
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_data_file")]
        data_file: PathBuf,

        #[serde(default)]
        case_insensitive_sort: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                data_file,
                case_insensitive_sort,
            } => Self {
                data_file,
                case_insensitive_sort,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            data_file: config.data_file,
            case_insensitive_sort: config.case_insensitive_sort,
        }
    }
}
