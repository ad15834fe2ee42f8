//! Configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{messages, CompilerOptions};

/// Input file selection (`[files]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Explicit root files, relative to the config file's directory
    #[serde(default)]
    pub files: Vec<String>,

    /// Directories walked for inputs. Unset means the config directory
    /// unless `files` is given.
    #[serde(default)]
    pub include: Option<Vec<String>>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Config files (or their directories) of referenced projects
    #[serde(default)]
    pub references: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            include: None,
            extensions: default_extensions(),
            references: Vec::new(),
        }
    }
}

impl FilesConfig {
    /// Directories to walk for inputs.
    pub fn include_directories(&self) -> Vec<String> {
        match &self.include {
            Some(include) => include.clone(),
            None if self.files.is_empty() => vec![".".to_string()],
            None => Vec::new(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["ts".to_string()]
}

/// Watch mode settings (`[watch]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period after the last change before a rebuild starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Status message codes that begin a new screen of output
    #[serde(default = "default_screen_starting_codes")]
    pub screen_starting_codes: Vec<u32>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            screen_starting_codes: default_screen_starting_codes(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_screen_starting_codes() -> Vec<u32> {
    messages::DEFAULT_SCREEN_STARTING_CODES.to_vec()
}

/// Main configuration structure (`kiln.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compiler: CompilerOptions,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}
