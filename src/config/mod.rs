//! Configuration module for Kiln
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (KILN_*)
//! 3. Project config (kiln.toml)
//! 4. User config (~/.config/kiln/config.toml)
//! 5. Built-in defaults (lowest priority)
//!
//! The project config replaces the user config as a whole; they are not merged.

mod loader;
mod types;

pub use loader::{
    load_user_or_default, load_with_warnings, parse_with_warnings, user_config_path,
    with_env_overrides, UnknownKey, PROJECT_CONFIG_FILE,
};
pub use types::{Config, FilesConfig, WatchConfig};
